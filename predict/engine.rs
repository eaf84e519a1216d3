//! # Prediction Engine
//!
//! `CostPredictor` owns the two startup artifacts and answers one prediction per
//! request. The artifacts are immutable after loading and are held behind `Arc`,
//! so clones of the predictor share them.

use crate::attributes::PatientAttributes;
use crate::columns::{ColumnsError, ExpectedColumns};
use crate::contributions::{Contribution, DEFAULT_TOP_K, rank_contributions};
use crate::features::FeatureVector;
use crate::model::{LinearModel, ModelError, clamp_charges};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Could not load column list '{path}': {source}")]
    Columns {
        path: String,
        #[source]
        source: ColumnsError,
    },
    #[error("Could not load model '{path}': {source}")]
    Model {
        path: String,
        #[source]
        source: ModelError,
    },
    #[error(transparent)]
    Prediction(#[from] ModelError),
}

/// The outcome of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The unclamped linear predictor.
    pub raw: f64,
    /// The estimated annual charges, never negative.
    pub charges: f64,
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone)]
pub struct CostPredictor {
    model: Arc<LinearModel>,
    columns: ExpectedColumns,
    top_k: usize,
}

impl CostPredictor {
    /// Pairs an already-loaded model with its column list, checking alignment.
    pub fn new(model: LinearModel, columns: ExpectedColumns) -> Result<Self, ModelError> {
        model.validate()?;
        model.ensure_aligned(&columns)?;
        Ok(Self {
            model: Arc::new(model),
            columns,
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Loads both artifacts from disk. Any failure here is fatal for the process.
    pub fn load(model_path: &Path, columns_path: &Path) -> Result<Self, EngineError> {
        let columns = ExpectedColumns::load(columns_path).map_err(|source| EngineError::Columns {
            path: columns_path.display().to_string(),
            source,
        })?;
        let model =
            LinearModel::load_aligned(model_path, &columns).map_err(|source| EngineError::Model {
                path: model_path.display().to_string(),
                source,
            })?;
        log::info!(
            "Model and column list agree on {} features",
            columns.len()
        );
        Ok(Self {
            model: Arc::new(model),
            columns,
            top_k: DEFAULT_TOP_K,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn columns(&self) -> &ExpectedColumns {
        &self.columns
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn feature_vector(&self, attributes: &PatientAttributes) -> FeatureVector {
        FeatureVector::build(attributes, &self.columns)
    }

    /// Builds the feature row, evaluates the model, clamps, and ranks contributions.
    pub fn predict(&self, attributes: &PatientAttributes) -> Result<Prediction, EngineError> {
        let features = self.feature_vector(attributes);
        let raw = self.model.predict(&features)?;
        let charges = clamp_charges(raw);
        if raw < 0.0 {
            log::debug!("Clamped negative prediction {raw:.2} to zero");
        }
        let contributions = rank_contributions(&features, &self.model, self.top_k)?;
        Ok(Prediction {
            raw,
            charges,
            contributions,
        })
    }
}
