//! Per-feature contributions (`coefficient * value`) ranked for display.

use crate::features::FeatureVector;
use crate::model::{LinearModel, ModelError};
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_TOP_K: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: String,
    pub value: f64,
}

/// Multiplies each feature by its coefficient and returns the `top_k` largest
/// products, largest first. The sort is stable, so equal products keep column order.
pub fn rank_contributions(
    features: &FeatureVector,
    model: &LinearModel,
    top_k: usize,
) -> Result<Vec<Contribution>, ModelError> {
    model.ensure_aligned(features.columns())?;

    let mut contributions: Vec<Contribution> = features
        .iter()
        .zip(&model.coefficients)
        .map(|((name, value), coef)| Contribution {
            feature: name.to_string(),
            value: coef * value,
        })
        .collect();

    // partial_cmp keeps 0.0 and -0.0 tied, which total_cmp would not.
    contributions.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    contributions.truncate(top_k);
    Ok(contributions)
}
