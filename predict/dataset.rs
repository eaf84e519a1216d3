//! # Reference Dataset
//!
//! The training dataset is shown only for context: the distribution of its
//! `charges` column. It is never consumed by the prediction path.
//!
//! - Loading goes through the `polars` CSV reader and validates the one column it
//!   needs (present, numeric, no nulls, finite).
//! - The histogram picks its bin count the way numpy's `"auto"` rule does: the
//!   larger of Sturges and Freedman-Diaconis.
//! - A Gaussian kernel density estimate with Scott's bandwidth is evaluated at the
//!   bin centres and scaled to counts, so it can be drawn over the bars.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const CHARGES_COLUMN: &str = "charges";

/// Upper bound on the number of bins for either rule.
pub const MAX_BINS: usize = 10_000;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(
        "The required column '{0}' was not found in the input file. Please check spelling and case."
    )]
    ColumnNotFound(String),
    #[error(
        "The required column '{column_name}' could not be converted to the expected type '{expected_type}'. It contains non-numeric data. (Found type: {found_type})"
    )]
    ColumnWrongType {
        column_name: String,
        expected_type: &'static str,
        found_type: String,
    },
    #[error(
        "Missing or null values were found in the required column '{0}'. This tool requires complete data with no missing values."
    )]
    MissingValuesFound(String),
    #[error(
        "Non-finite values (NaN or Infinity) were found in the required column '{0}'. This tool requires all data to be finite."
    )]
    NonFiniteValuesFound(String),
    #[error("The dataset contains no rows.")]
    Empty,
}

/// Loads the `charges` column of a comma-separated reference dataset.
pub fn load_charges(path: &Path) -> Result<Vec<f64>, DataError> {
    let df = CsvReader::new(File::open(path)?)
        .with_options(CsvReadOptions::default().with_has_header(true))
        .finish()?;

    if !df
        .get_column_names()
        .iter()
        .any(|c| c.as_str() == CHARGES_COLUMN)
    {
        return Err(DataError::ColumnNotFound(CHARGES_COLUMN.to_string()));
    }

    let values = extract_numeric_column(&df, CHARGES_COLUMN)?;
    if values.is_empty() {
        return Err(DataError::Empty);
    }
    log::info!(
        "Loaded {} '{}' values from {}",
        values.len(),
        CHARGES_COLUMN,
        path.display()
    );
    Ok(values)
}

fn extract_numeric_column(df: &DataFrame, column_name: &str) -> Result<Vec<f64>, DataError> {
    let series = df.column(column_name)?;
    if series.null_count() > 0 {
        return Err(DataError::MissingValuesFound(column_name.to_string()));
    }

    let casted = match series.cast(&DataType::Float64) {
        Ok(casted) => casted,
        Err(_) => {
            return Err(DataError::ColumnWrongType {
                column_name: column_name.to_string(),
                expected_type: "f64 (numeric)",
                found_type: format!("{:?}", series.dtype()),
            });
        }
    };

    if casted.null_count() > 0 {
        return Err(DataError::ColumnWrongType {
            column_name: column_name.to_string(),
            expected_type: "f64 (numeric)",
            found_type: format!("{:?}", series.dtype()),
        });
    }

    let chunked = casted.f64()?.rechunk();
    let values: Vec<f64> = chunked.into_no_null_iter().collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DataError::NonFiniteValuesFound(column_name.to_string()));
    }
    Ok(values)
}

/// How many bins to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinRule {
    #[default]
    Auto,
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Kernel density at the bin centre, scaled to the same units as `count`.
    pub density: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub total: usize,
}

impl Histogram {
    pub fn from_values(values: &[f64], rule: BinRule) -> Result<Self, DataError> {
        if values.is_empty() {
            return Err(DataError::Empty);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let n_bins = match rule {
            BinRule::Fixed(n) => n.clamp(1, MAX_BINS),
            BinRule::Auto => auto_bin_count(&sorted),
        };

        // A degenerate range still needs a non-zero width to place values.
        let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
        let width = (hi - lo) / n_bins as f64;

        let mut counts = vec![0usize; n_bins];
        for &v in &sorted {
            let idx = (((v - lo) / width).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        let bandwidth = scott_bandwidth(&sorted);
        let n = sorted.len() as f64;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = lo + width * i as f64;
                let upper = if i + 1 == n_bins { hi } else { lower + width };
                let centre = (lower + upper) / 2.0;
                let density = bandwidth.map(|h| gaussian_kde(&sorted, h, centre) * n * width);
                HistogramBin {
                    lower,
                    upper,
                    count,
                    density,
                }
            })
            .collect();

        log::debug!("Histogram with {n_bins} bins over [{lo}, {hi}], bandwidth {bandwidth:?}");

        Ok(Self {
            bins,
            total: sorted.len(),
        })
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    let sturges = (n.log2().ceil() as usize + 1).max(1);
    if range <= 0.0 {
        return 1;
    }

    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    if iqr <= 0.0 {
        return sturges;
    }
    let fd_width = 2.0 * iqr * n.powf(-1.0 / 3.0);
    // Freedman-Diaconis is unbounded for a narrow IQR next to a far outlier.
    let fd = (range / fd_width).ceil() as usize;
    sturges.max(fd).min(sorted.len()).clamp(1, MAX_BINS)
}

/// Linear-interpolated quantile over sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std > 0.0 {
        Some(std * n.powf(-0.2))
    } else {
        None
    }
}

fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * bandwidth * values.len() as f64);
    values
        .iter()
        .map(|v| {
            let z = (x - v) / bandwidth;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        * norm
}
