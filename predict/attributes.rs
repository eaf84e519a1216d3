//! # Patient Attributes
//!
//! The six inputs a prediction is made from. Numeric fields carry the same bounds
//! as the input controls that produce them; categorical fields are closed enums so
//! that an unrecognized string is rejected at parse time instead of silently
//! collapsing into the reference category of the one-hot encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;
pub const BMI_RANGE: RangeInclusive<f64> = 10.0..=60.0;
pub const CHILDREN_RANGE: RangeInclusive<u32> = 0..=10;

pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_BMI: f64 = 25.0;
pub const DEFAULT_CHILDREN: u32 = 0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("Unrecognized value '{value}' for {field}. Expected one of: {expected}.")]
    UnrecognizedCategory {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{field} must lie within [{min}, {max}], got {value}.")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a finite number, got {value}.")]
    NotFinite { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    Yes,
    No,
}

/// US census region of the beneficiary. `Northeast` is the reference category of
/// the drop-first encoding and therefore has no column of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    pub fn as_str(self) -> &'static str {
        match self {
            Smoker::Yes => "yes",
            Smoker::No => "no",
        }
    }
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
        }
    }
}

/// Parses a categorical value by comparing against the lowercase names of every
/// variant. Shared by the three `FromStr` impls below.
fn parse_category<T: Copy>(
    raw: &str,
    field: &'static str,
    expected: &'static str,
    variants: &[T],
    name: fn(T) -> &'static str,
) -> Result<T, AttributeError> {
    let needle = raw.trim().to_ascii_lowercase();
    variants
        .iter()
        .copied()
        .find(|&v| name(v) == needle)
        .ok_or_else(|| AttributeError::UnrecognizedCategory {
            field,
            value: raw.to_string(),
            expected,
        })
}

impl FromStr for Sex {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s, "sex", "male, female", &Sex::ALL, Sex::as_str)
    }
}

impl FromStr for Smoker {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s, "smoker", "yes, no", &Smoker::ALL, Smoker::as_str)
    }
}

impl FromStr for Region {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(
            s,
            "region",
            "northeast, northwest, southeast, southwest",
            &Region::ALL,
            Region::as_str,
        )
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Smoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patient's inputs. Created fresh for every prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAttributes {
    pub age: u32,
    pub bmi: f64,
    pub children: u32,
    pub sex: Sex,
    pub smoker: Smoker,
    pub region: Region,
}

impl Default for PatientAttributes {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            bmi: DEFAULT_BMI,
            children: DEFAULT_CHILDREN,
            sex: Sex::Male,
            smoker: Smoker::Yes,
            region: Region::Northeast,
        }
    }
}

impl PatientAttributes {
    /// Checks the numeric fields against the bounds of the input controls.
    ///
    /// Values coming from the command line or the form are already bounded; this is
    /// for rows read from files, which have no control in front of them.
    pub fn validate(&self) -> Result<(), AttributeError> {
        check_range("age", f64::from(self.age), &as_f64_range(&AGE_RANGE))?;
        if !self.bmi.is_finite() {
            return Err(AttributeError::NotFinite {
                field: "bmi",
                value: self.bmi,
            });
        }
        check_range("bmi", self.bmi, &BMI_RANGE)?;
        check_range(
            "children",
            f64::from(self.children),
            &as_f64_range(&CHILDREN_RANGE),
        )?;
        Ok(())
    }
}

fn as_f64_range(range: &RangeInclusive<u32>) -> RangeInclusive<f64> {
    f64::from(*range.start())..=f64::from(*range.end())
}

fn check_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), AttributeError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AttributeError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
