//! # Feature Vector Builder
//!
//! Turns a set of `PatientAttributes` into the single numeric row the model
//! consumes, laid out in exactly the order of the `ExpectedColumns`.
//!
//! Encoding rules:
//! - `age`, `bmi` and `children` are copied in raw units. The model was fit on
//!   unscaled values.
//! - `sex_male`, `smoker_yes`: 1 for the named level, 0 otherwise.
//! - `region_northwest`, `region_southeast`, `region_southwest`: 1 for the matching
//!   region. `northeast` is the dropped reference level and produces all zeros.
//! - Any other column in the list stays at 0.

use crate::attributes::{PatientAttributes, Region, Sex, Smoker};
use crate::columns::{self, ExpectedColumns};
use ndarray::Array1;

/// One model input row, positionally aligned with its column list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: ExpectedColumns,
    values: Array1<f64>,
}

impl FeatureVector {
    /// Builds the feature row for one patient.
    pub fn build(attributes: &PatientAttributes, columns: &ExpectedColumns) -> Self {
        let mut values = Array1::zeros(columns.len());

        let mut set = |name: &str, value: f64| {
            if let Some(idx) = columns.position(name) {
                values[idx] = value;
            }
        };

        set(columns::AGE, f64::from(attributes.age));
        set(columns::BMI, attributes.bmi);
        set(columns::CHILDREN, f64::from(attributes.children));
        set(columns::SEX_MALE, indicator(attributes.sex == Sex::Male));
        set(columns::SMOKER_YES, indicator(attributes.smoker == Smoker::Yes));

        for (name, region) in [
            (columns::REGION_NORTHWEST, Region::Northwest),
            (columns::REGION_SOUTHEAST, Region::Southeast),
            (columns::REGION_SOUTHWEST, Region::Southwest),
        ] {
            set(name, indicator(attributes.region == region));
        }

        log::debug!("Built feature vector {:?}", values.as_slice());

        Self {
            columns: columns.clone(),
            values,
        }
    }

    pub fn columns(&self) -> &ExpectedColumns {
        &self.columns
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Looks up a single feature by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.position(name).map(|idx| self.values[idx])
    }

    /// Iterates `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
