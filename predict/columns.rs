//! # Expected Column List
//!
//! The ordered feature names the model was fit against, stored as a JSON array of
//! strings. The order is the contract: the feature vector, the coefficient vector
//! and this list are all positionally aligned.
//!
//! The builder in `features.rs` speaks a drop-first one-hot dialect. Loading a list
//! therefore also verifies that the list was produced by the same convention: every
//! column the builder writes must be present, and no reference-category column may
//! appear. A list that fails either check would yield systematically biased
//! predictions, so it is rejected before any prediction is made.

use std::collections::HashSet;
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub const AGE: &str = "age";
pub const BMI: &str = "bmi";
pub const CHILDREN: &str = "children";
pub const SEX_MALE: &str = "sex_male";
pub const SMOKER_YES: &str = "smoker_yes";
pub const REGION_NORTHWEST: &str = "region_northwest";
pub const REGION_SOUTHEAST: &str = "region_southeast";
pub const REGION_SOUTHWEST: &str = "region_southwest";

/// Every column the feature builder knows how to fill, in training order.
pub const RECOGNIZED_COLUMNS: [&str; 8] = [
    AGE,
    BMI,
    CHILDREN,
    SEX_MALE,
    SMOKER_YES,
    REGION_NORTHWEST,
    REGION_SOUTHEAST,
    REGION_SOUTHWEST,
];

/// Columns that only exist under a full (not drop-first) one-hot encoding.
pub const REFERENCE_CATEGORY_COLUMNS: [&str; 3] = ["sex_female", "smoker_no", "region_northeast"];

#[derive(Error, Debug)]
pub enum ColumnsError {
    #[error("Failed to read column list: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse column list as a JSON array of strings: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("The column list is empty.")]
    Empty,
    #[error("Column '{0}' appears more than once in the column list.")]
    DuplicateColumn(String),
    #[error(
        "Column '{0}' is missing from the column list. The model must be trained on drop-first one-hot features including it."
    )]
    MissingRequiredColumn(String),
    #[error(
        "Column '{0}' is a reference category. The column list was produced by a full one-hot encoding, not drop-first."
    )]
    ReferenceCategoryPresent(String),
}

/// An immutable, cheaply clonable handle to the ordered column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedColumns {
    names: Arc<[String]>,
}

impl ExpectedColumns {
    /// Builds a column list, enforcing the drop-first encoding contract.
    pub fn new(names: Vec<String>) -> Result<Self, ColumnsError> {
        if names.is_empty() {
            return Err(ColumnsError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ColumnsError::DuplicateColumn(name.clone()));
            }
        }

        if let Some(reference) = REFERENCE_CATEGORY_COLUMNS
            .iter()
            .find(|c| seen.contains(**c))
        {
            return Err(ColumnsError::ReferenceCategoryPresent(reference.to_string()));
        }

        if let Some(missing) = RECOGNIZED_COLUMNS.iter().find(|c| !seen.contains(**c)) {
            return Err(ColumnsError::MissingRequiredColumn(missing.to_string()));
        }

        Ok(Self {
            names: names.into(),
        })
    }

    /// The canonical column order produced by `pd.get_dummies(drop_first=True)` on
    /// the insurance dataset.
    pub fn canonical() -> Self {
        Self {
            names: RECOGNIZED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Reads a JSON array of column names from disk.
    pub fn load(path: &Path) -> Result<Self, ColumnsError> {
        let text = fs::read_to_string(path)?;
        let names: Vec<String> = serde_json::from_str(&text)?;
        log::debug!("Read {} column names from {}", names.len(), path.display());
        Self::new(names)
    }

    pub fn save(&self, path: &Path) -> Result<(), ColumnsError> {
        let text = serde_json::to_string_pretty(&*self.names)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Deref for ExpectedColumns {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.names
    }
}
