//! Batch scoring: a CSV of patients in, a TSV of predictions out.
//!
//! Input columns are `age,bmi,children,sex,smoker,region`, plus an optional `id`.
//! Rows are validated like any other file input; the first bad row aborts the run
//! with its 1-based row number.

use crate::attributes::{AttributeError, PatientAttributes};
use crate::engine::{CostPredictor, EngineError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: AttributeError,
    },
    #[error("Row {row}: {source}")]
    Prediction {
        row: usize,
        #[source]
        source: EngineError,
    },
}

/// One input row, kept as strings for the categorical fields so that the error
/// message names the offending value.
#[derive(Debug, Deserialize)]
struct PatientRecord {
    #[serde(default)]
    id: Option<String>,
    age: u32,
    bmi: f64,
    children: u32,
    sex: String,
    smoker: String,
    region: String,
}

impl PatientRecord {
    fn into_attributes(self) -> Result<PatientAttributes, AttributeError> {
        let attributes = PatientAttributes {
            age: self.age,
            bmi: self.bmi,
            children: self.children,
            sex: self.sex.parse()?,
            smoker: self.smoker.parse()?,
            region: self.region.parse()?,
        };
        attributes.validate()?;
        Ok(attributes)
    }
}

/// One scored row, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub id: String,
    #[serde(serialize_with = "six_decimals")]
    pub prediction: f64,
}

fn six_decimals<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{value:.6}"))
}

/// Scores every row of `input`. Nothing is returned unless every row is valid,
/// so a failed run never yields a partial result.
pub fn predict_rows<R: Read>(
    predictor: &CostPredictor,
    input: R,
) -> Result<Vec<PredictionRecord>, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut scored = Vec::new();
    for (i, record) in reader.deserialize::<PatientRecord>().enumerate() {
        let row = i + 1;
        let record = record?;
        let id = record
            .id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| row.to_string());
        let attributes = record
            .into_attributes()
            .map_err(|source| BatchError::InvalidRow { row, source })?;
        let prediction = predictor
            .predict(&attributes)
            .map_err(|source| BatchError::Prediction { row, source })?;

        scored.push(PredictionRecord {
            id,
            prediction: prediction.charges,
        });
    }
    Ok(scored)
}

/// Writes `id\tprediction` rows to `output`. Returns the number of rows written.
pub fn write_predictions<W: Write>(
    records: &[PredictionRecord],
    output: W,
) -> Result<usize, BatchError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(output);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    log::info!("Wrote {} predictions", records.len());
    Ok(records.len())
}

/// Scores every row of `input` and, only if all rows are valid, writes them to
/// `output`.
pub fn predict_csv<R: Read, W: Write>(
    predictor: &CostPredictor,
    input: R,
    output: W,
) -> Result<usize, BatchError> {
    let records = predict_rows(predictor, input)?;
    write_predictions(&records, output)
}
