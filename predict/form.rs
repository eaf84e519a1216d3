//! # Interactive Form
//!
//! A line-oriented stand-in for the graphical form: one prompt per input control,
//! then the "Predict" trigger and the distribution toggle. Every prompt shows its
//! bounds or choices and a default; an empty line takes the default and anything
//! invalid is reported and asked again. End of input ends the session.

use crate::attributes::{
    AGE_RANGE, BMI_RANGE, CHILDREN_RANGE, PatientAttributes, Region, Sex, Smoker,
};
use crate::dataset::{self, BinRule, Histogram};
use crate::engine::{CostPredictor, EngineError};
use crate::report;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Where the optional distribution view reads its data from.
#[derive(Debug, Clone, Copy)]
pub struct DistributionSource<'a> {
    pub path: &'a Path,
    pub bins: BinRule,
}

pub struct Form<'a, R, W> {
    predictor: &'a CostPredictor,
    distribution: Option<DistributionSource<'a>>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Form<'a, R, W> {
    pub fn new(
        predictor: &'a CostPredictor,
        distribution: Option<DistributionSource<'a>>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            predictor,
            distribution,
            input,
            output,
        }
    }

    /// Runs the form until the user stops or input ends. Returns how many
    /// predictions were shown.
    pub fn run(&mut self) -> Result<usize, FormError> {
        let mut predictions = 0;
        loop {
            let Some(attributes) = self.collect_attributes()? else {
                break;
            };

            match self.ask_yes_no("Predict?", true)? {
                Some(true) => {
                    let prediction = self.predictor.predict(&attributes)?;
                    writeln!(self.output, "{}", report::render_estimate(prediction.charges))?;
                    write!(
                        self.output,
                        "{}",
                        report::render_contributions(&prediction.contributions)
                    )?;
                    predictions += 1;
                }
                Some(false) => {}
                None => break,
            }

            match self.ask_yes_no("Show dataset charge distribution (for context)?", false)? {
                Some(true) => self.show_distribution()?,
                Some(false) => {}
                None => break,
            }

            match self.ask_yes_no("Another patient?", false)? {
                Some(true) => continue,
                Some(false) | None => break,
            }
        }
        log::debug!("Form session ended after {predictions} predictions");
        Ok(predictions)
    }

    fn collect_attributes(&mut self) -> io::Result<Option<PatientAttributes>> {
        let defaults = PatientAttributes::default();
        writeln!(self.output, "Enter patient details")?;

        let Some(age) = self.ask_bounded("Age", AGE_RANGE, defaults.age)? else {
            return Ok(None);
        };
        let Some(bmi) = self.ask_bounded("BMI", BMI_RANGE, defaults.bmi)? else {
            return Ok(None);
        };
        let Some(children) = self.ask_bounded("Children", CHILDREN_RANGE, defaults.children)?
        else {
            return Ok(None);
        };
        let Some(sex) = self.ask_choice("Sex", &Sex::ALL, defaults.sex)? else {
            return Ok(None);
        };
        let Some(smoker) = self.ask_choice("Smoker", &Smoker::ALL, defaults.smoker)? else {
            return Ok(None);
        };
        let Some(region) = self.ask_choice("Region", &Region::ALL, defaults.region)? else {
            return Ok(None);
        };

        Ok(Some(PatientAttributes {
            age,
            bmi,
            children,
            sex,
            smoker,
            region,
        }))
    }

    fn show_distribution(&mut self) -> io::Result<()> {
        let Some(source) = self.distribution else {
            writeln!(self.output, "No reference dataset configured.")?;
            return Ok(());
        };
        let rendered = dataset::load_charges(source.path)
            .and_then(|values| Histogram::from_values(&values, source.bins));
        match rendered {
            Ok(histogram) => write!(self.output, "{}", report::render_histogram(&histogram)),
            Err(e) => {
                log::warn!("Distribution unavailable: {e}");
                writeln!(
                    self.output,
                    "Could not load dataset '{}': {e}",
                    source.path.display()
                )
            }
        }
    }

    /// Reads one trimmed line. `None` means end of input.
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask<T>(
        &mut self,
        prompt: &str,
        default: T,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.read_answer(prompt)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(msg) => writeln!(self.output, "  {msg}")?,
            }
        }
    }

    fn ask_bounded<T>(
        &mut self,
        label: &str,
        range: RangeInclusive<T>,
        default: T,
    ) -> io::Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        let prompt = format!(
            "{label} [{}-{}] ({default})",
            range.start(),
            range.end()
        );
        self.ask(&prompt, default, |raw| {
            let value: T = raw
                .parse()
                .map_err(|_| format!("'{raw}' is not a valid number."))?;
            if range.contains(&value) {
                Ok(value)
            } else {
                Err(format!(
                    "{label} must be between {} and {}.",
                    range.start(),
                    range.end()
                ))
            }
        })
    }

    fn ask_choice<T>(&mut self, label: &str, choices: &[T], default: T) -> io::Result<Option<T>>
    where
        T: FromStr + Display + Copy,
        T::Err: Display,
    {
        let options = choices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        let prompt = format!("{label} [{options}] ({default})");
        self.ask(&prompt, default, |raw| raw.parse().map_err(|e: T::Err| e.to_string()))
    }

    fn ask_yes_no(&mut self, question: &str, default: bool) -> io::Result<Option<bool>> {
        let hint = if default { "Y/n" } else { "y/N" };
        let prompt = format!("{question} [{hint}]");
        self.ask(&prompt, default, |raw| match raw.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err("Please answer y or n.".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ExpectedColumns;
    use crate::model::LinearModel;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn predictor() -> CostPredictor {
        let model = LinearModel {
            name: "test".to_string(),
            intercept: 0.0,
            feature_names: ExpectedColumns::canonical().to_vec(),
            coefficients: vec![100.0, 10.0, 1000.0, 0.0, 20000.0, 0.0, 0.0, 0.0],
        };
        CostPredictor::new(model, ExpectedColumns::canonical()).unwrap()
    }

    fn run(input: &str, distribution: Option<DistributionSource<'_>>) -> (usize, String) {
        let predictor = predictor();
        let mut output = Vec::new();
        let count = Form::new(&predictor, distribution, Cursor::new(input), &mut output)
            .run()
            .unwrap();
        (count, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_all_defaults() {
        // Six empty answers, predict (default yes), no distribution, no more patients.
        let (count, text) = run("\n\n\n\n\n\n\n\n\n", None);
        assert_eq!(count, 1);
        // 30 * 100 + 25 * 10 + 0 + smoker 20000
        assert!(text.contains("Estimated annual medical charges: $23,250.00"));
        assert!(text.contains("Feature contributions"));
    }

    #[test]
    fn test_reprompts_on_invalid_input() {
        let input = "17\nabc\n45\n\n2\nfemale\nmaybe\nno\nsouthwest\ny\nn\nn\n";
        let (count, text) = run(input, None);
        assert_eq!(count, 1);
        assert!(text.contains("Age must be between 18 and 100."));
        assert!(text.contains("'abc' is not a valid number."));
        assert!(text.contains("Unrecognized value 'maybe' for smoker"));
        // 45 * 100 + 25 * 10 + 2 * 1000
        assert!(text.contains("$6,750.00"));
    }

    #[test]
    fn test_end_of_input_stops_cleanly() {
        let (count, text) = run("40\n30\n", None);
        assert_eq!(count, 0);
        assert!(!text.contains("Estimated"));
    }

    #[test]
    fn test_declining_predict_and_looping() {
        let input = "\n\n\n\n\n\nn\nn\ny\n\n\n\n\n\n\n\nno\nn\n";
        let (count, text) = run(input, None);
        assert_eq!(count, 1);
        assert_eq!(text.matches("Enter patient details").count(), 2);
    }

    #[test]
    fn test_distribution_without_dataset() {
        let (count, text) = run("\n\n\n\n\n\nn\ny\nn\n", None);
        assert_eq!(count, 0);
        assert!(text.contains("No reference dataset configured."));
    }

    #[test]
    fn test_distribution_with_dataset() {
        let file = NamedTempFile::new().unwrap();
        let mut csv = String::from("age,charges\n");
        for i in 0..50 {
            csv.push_str(&format!("{},{}\n", 20 + i, 1000.0 + 250.0 * i as f64));
        }
        std::fs::write(file.path(), csv).unwrap();

        let source = DistributionSource {
            path: file.path(),
            bins: BinRule::Fixed(5),
        };
        let (count, text) = run("\n\n\n\n\n\nn\ny\nn\n", Some(source));
        assert_eq!(count, 0);
        assert!(text.contains("Dataset charge distribution (50 records, 5 bins):"));
    }

    #[test]
    fn test_distribution_load_failure_is_reported_not_fatal() {
        let source = DistributionSource {
            path: Path::new("/nonexistent/insurance.csv"),
            bins: BinRule::Auto,
        };
        let (count, text) = run("\n\n\n\n\n\ny\ny\nn\n", Some(source));
        assert_eq!(count, 1);
        assert!(text.contains("Could not load dataset '/nonexistent/insurance.csv'"));
    }
}
