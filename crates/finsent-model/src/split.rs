//! Stratified train/validation split.

use crate::error::{ModelError, Result};
use finsent_corpus::Label;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Indices of the training and validation rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitIndices {
    /// Training rows
    pub train: Vec<usize>,
    /// Validation rows
    pub validation: Vec<usize>,
}

/// Split row indices so each label keeps its share in both parts.
///
/// Every label gets `round(n * validation_fraction)` validation rows, but at
/// least one row of each label stays in training. Both parts are shuffled.
pub fn stratified_split(labels: &[Label], validation_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&validation_fraction) {
        return Err(ModelError::InvalidArgs(format!(
            "validation fraction must be in [0, 1), got {validation_fraction}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = SplitIndices::default();
    for label in Label::ALL {
        let mut rows: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect();
        if rows.is_empty() {
            continue;
        }
        rows.shuffle(&mut rng);

        let wanted = (rows.len() as f64 * validation_fraction).round() as usize;
        let n_val = wanted.min(rows.len() - 1);
        split.validation.extend_from_slice(&rows[..n_val]);
        split.train.extend_from_slice(&rows[n_val..]);
    }

    split.train.shuffle(&mut rng);
    split.validation.shuffle(&mut rng);
    Ok(split)
}
