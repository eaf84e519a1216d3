#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

use medcost::attributes::{
    BMI_RANGE, DEFAULT_AGE, DEFAULT_BMI, DEFAULT_CHILDREN, PatientAttributes, Region, Sex, Smoker,
};
use medcost::batch::{predict_rows, write_predictions};
use medcost::columns::REFERENCE_CATEGORY_COLUMNS;
use medcost::config::{AppConfig, Overrides};
use medcost::dataset::{Histogram, load_charges};
use medcost::engine::CostPredictor;
use medcost::form::{DistributionSource, Form};
use medcost::report;

#[derive(Parser)]
#[command(
    name = "medcost",
    version,
    about = "Estimate annual medical insurance charges with a pre-trained linear model.",
    long_about = "Loads a linear regression model (TOML) and the ordered list of its feature \
                  columns (JSON), encodes patient attributes with drop-first one-hot columns, \
                  and reports the estimated charges together with the largest per-feature \
                  contributions."
)]
struct Cli {
    /// Optional TOML config file with artifact paths and display settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the trained model file (.toml)
    #[arg(long, global = true, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Path to the JSON list of expected feature columns
    #[arg(long, global = true, value_name = "FILE")]
    columns: Option<PathBuf>,

    /// Path to the reference dataset (.csv with a 'charges' column)
    #[arg(long, global = true, value_name = "FILE")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict charges for one patient given on the command line
    Predict(PredictArgs),
    /// Fill in patient details interactively
    Form,
    /// Show the charge distribution of the reference dataset
    Distribution,
    /// Predict charges for every row of a CSV file (outputs: predictions.tsv)
    Batch(BatchArgs),
    /// Print the loaded model and its encoding contract
    Inspect,
    /// Print version information
    Version,
}

#[derive(Args)]
struct PredictArgs {
    /// Age in years
    #[arg(long, default_value_t = DEFAULT_AGE, value_parser = clap::value_parser!(u32).range(18..=100))]
    age: u32,

    /// Body-mass index
    #[arg(long, default_value_t = DEFAULT_BMI, value_parser = parse_bmi)]
    bmi: f64,

    /// Number of children covered
    #[arg(long, default_value_t = DEFAULT_CHILDREN, value_parser = clap::value_parser!(u32).range(0..=10))]
    children: u32,

    /// male or female
    #[arg(long, default_value = "male")]
    sex: Sex,

    /// yes or no
    #[arg(long, default_value = "yes")]
    smoker: Smoker,

    /// northeast, northwest, southeast or southwest
    #[arg(long, default_value = "northeast")]
    region: Region,

    /// Also print the reference dataset's charge distribution
    #[arg(long)]
    show_distribution: bool,

    /// Print the prediction as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV file with age,bmi,children,sex,smoker,region columns
    input: PathBuf,

    /// Where to write the predictions
    #[arg(long, default_value = "predictions.tsv")]
    output: PathBuf,
}

fn parse_bmi(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if BMI_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "{value} is not in {}..={}",
            BMI_RANGE.start(),
            BMI_RANGE.end()
        ))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Cli {
        config,
        model,
        columns,
        dataset,
        command,
    } = cli;
    let overrides = Overrides {
        model,
        columns,
        dataset,
    };

    let result = match command {
        Some(Commands::Version) => {
            println!("medcost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(command) => AppConfig::resolve(config.as_deref(), overrides)
            .map_err(Into::into)
            .and_then(|app| run(command, &app)),
        None => Cli::command().print_help().map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Commands, app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Predict(args) => run_predict(args, app),
        Commands::Form => run_form(app),
        Commands::Distribution => show_distribution(app),
        Commands::Batch(args) => run_batch(args, app),
        Commands::Inspect => run_inspect(app),
        Commands::Version => Ok(()),
    }
}

fn load_predictor(app: &AppConfig) -> Result<CostPredictor, Box<dyn std::error::Error>> {
    log::info!(
        "Loading model from {} and columns from {}",
        app.model_path.display(),
        app.columns_path.display()
    );
    Ok(CostPredictor::load(&app.model_path, &app.columns_path)?.with_top_k(app.top_k))
}

fn run_predict(args: PredictArgs, app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let predictor = load_predictor(app)?;
    let attributes = PatientAttributes {
        age: args.age,
        bmi: args.bmi,
        children: args.children,
        sex: args.sex,
        smoker: args.smoker,
        region: args.region,
    };

    let prediction = predictor.predict(&attributes)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{}", report::render_estimate(prediction.charges));
        println!();
        print!("{}", report::render_contributions(&prediction.contributions));
    }

    if args.show_distribution {
        println!();
        show_distribution(app)?;
    }
    Ok(())
}

fn run_form(app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let predictor = load_predictor(app)?;
    let distribution = DistributionSource {
        path: &app.dataset_path,
        bins: app.bins,
    };

    println!("Medical Insurance Cost Predictor");
    let stdin = io::stdin();
    let stdout = io::stdout();
    let count = Form::new(&predictor, Some(distribution), stdin.lock(), stdout.lock()).run()?;
    log::info!("Made {count} predictions");
    Ok(())
}

fn show_distribution(app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let values = load_charges(&app.dataset_path)?;
    let histogram = Histogram::from_values(&values, app.bins)?;
    print!("{}", report::render_histogram(&histogram));
    Ok(())
}

fn run_batch(args: BatchArgs, app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let predictor = load_predictor(app)?;
    println!("Loading patients from: {}", args.input.display());
    let input = BufReader::new(File::open(&args.input)?);
    let records = predict_rows(&predictor, input)?;
    let output = BufWriter::new(File::create(&args.output)?);
    let count = write_predictions(&records, output)?;
    println!(
        "{count} predictions saved to: {}",
        args.output.display()
    );
    Ok(())
}

fn run_inspect(app: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let predictor = load_predictor(app)?;
    let model = predictor.model();

    println!("Model: {}", model.name);
    println!("Intercept: {:.4}", model.intercept);
    let width = model
        .feature_names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);
    println!("{:<width$}  {:>14}", "feature", "coefficient");
    for (name, coef) in model.feature_names.iter().zip(&model.coefficients) {
        println!("{name:<width$}  {coef:>14.4}");
    }
    println!();
    println!(
        "Encoding: drop-first one-hot; absent reference columns: {}",
        REFERENCE_CATEGORY_COLUMNS.join(", ")
    );
    println!(
        "Column list '{}' matches the model's {} features in order.",
        app.columns_path.display(),
        predictor.columns().len()
    );
    Ok(())
}
