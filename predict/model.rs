use crate::columns::ExpectedColumns;
use crate::features::FeatureVector;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// --- Public Data Structures ---
// This struct defines the public, human-readable format of the fitted model
// when serialized to a TOML file.

/// A fitted ordinary least squares model: `charges = intercept + coefficients . x`.
///
/// `feature_names` and `coefficients` are parallel; together they are the
/// coefficient vector keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub intercept: f64,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
}

fn default_model_name() -> String {
    "linear".to_string()
}

/// Custom error type for model loading, saving, and prediction.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read or write model file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML model file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize model to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Model has {coefficients} coefficients but {features} feature names.")]
    MismatchedCoefficientCount { coefficients: usize, features: usize },
    #[error("Model coefficient for '{0}' is not a finite number.")]
    NonFiniteCoefficient(String),
    #[error("Model intercept is not a finite number.")]
    NonFiniteIntercept,
    #[error(
        "Feature columns do not match the model. Expected [{expected}], found [{found}]. The column list must be the one the model was trained with."
    )]
    ColumnMismatch { expected: String, found: String },
}

impl LinearModel {
    /// Checks the internal consistency of a freshly deserialized model.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ModelError::MismatchedCoefficientCount {
                coefficients: self.coefficients.len(),
                features: self.feature_names.len(),
            });
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFiniteIntercept);
        }
        if let Some((name, _)) = self
            .feature_names
            .iter()
            .zip(&self.coefficients)
            .find(|(_, c)| !c.is_finite())
        {
            return Err(ModelError::NonFiniteCoefficient(name.clone()));
        }
        Ok(())
    }

    /// Verifies that a column list is positionally identical to the model's features.
    /// This is the check that ties the one-hot builder to the fitted weights.
    pub fn ensure_aligned(&self, columns: &[String]) -> Result<(), ModelError> {
        if self.feature_names.as_slice() != columns {
            return Err(ModelError::ColumnMismatch {
                expected: self.feature_names.join(", "),
                found: columns.join(", "),
            });
        }
        Ok(())
    }

    /// Loads a model and checks it against the expected column list.
    pub fn load_aligned(path: &Path, columns: &ExpectedColumns) -> Result<Self, ModelError> {
        let model = Self::load(path)?;
        model.ensure_aligned(columns)?;
        Ok(model)
    }

    pub fn coefficient_vector(&self) -> Array1<f64> {
        Array1::from_vec(self.coefficients.clone())
    }

    /// Computes the raw linear predictor. The result may be negative; callers that
    /// display a cost clamp it with [`clamp_charges`].
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.ensure_aligned(features.columns())?;
        let coeffs = self.coefficient_vector();
        Ok(self.intercept + features.values().dot(&coeffs))
    }

    /// Saves the model to a file in a human-readable TOML format.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Loads a model from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let toml_string = fs::read_to_string(path)?;
        let model: Self = toml::from_str(&toml_string)?;
        model.validate()?;
        log::info!(
            "Loaded model '{}' with {} coefficients from {}",
            model.name,
            model.coefficients.len(),
            path.display()
        );
        Ok(model)
    }
}

/// Negative costs are meaningless; a negative linear predictor is reported as zero.
pub fn clamp_charges(raw: f64) -> f64 {
    raw.max(0.0)
}
