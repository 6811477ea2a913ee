//! Classifier invocation and class-order reconciliation.
//!
//! A classifier reports probabilities in its own column order (`classes()`),
//! which is not assumed to match the label encoder's order. `predict`
//! re-indexes the probabilities so position `i` always belongs to label
//! code `i`.
use ndarray::Array1;

use crate::bundle::ArtifactBundle;
use crate::error::{PredictionError, Result};

/// Accepted deviation of a probability vector's sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Check that a classifier's class codes are a permutation of the label
/// encoder's code space `0..n_labels`.
pub(crate) fn check_class_alignment(classes: &[usize], n_labels: usize) -> Result<(), String> {
    if classes.len() != n_labels {
        return Err(format!(
            "classifier knows {} classes but the label encoder has {}",
            classes.len(),
            n_labels
        ));
    }
    let mut seen = vec![false; n_labels];
    for &code in classes {
        match seen.get_mut(code) {
            None => {
                return Err(format!(
                    "classifier class code {} is outside the label encoder's {} labels",
                    code, n_labels
                ))
            }
            Some(true) => return Err(format!("classifier lists class code {} twice", code)),
            Some(slot) => *slot = true,
        }
    }
    Ok(())
}

/// Run the classifier on an already scaled vector.
///
/// Returns the predicted class code and the probabilities, both in the
/// label encoder's code space.
pub fn predict(bundle: &ArtifactBundle, scaled: &Array1<f64>) -> Result<(usize, Array1<f64>)> {
    let classifier = bundle.classifier();
    let x = scaled.view();

    let class_code = classifier.predict(x)?;
    let native = classifier.predict_proba(x)?;

    let classes = classifier.classes();
    if native.len() != classes.len() {
        return Err(PredictionError::ModelInference(format!(
            "{} returned {} probabilities for {} classes",
            classifier.name(),
            native.len(),
            classes.len()
        )));
    }
    if native.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(PredictionError::ModelInference(format!(
            "{} returned invalid probabilities {:?}",
            classifier.name(),
            native
        )));
    }
    let total = native.sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PredictionError::ModelInference(format!(
            "{} probabilities sum to {}",
            classifier.name(),
            total
        )));
    }

    check_class_alignment(classes, bundle.label_encoder().len()).map_err(PredictionError::Schema)?;
    let mut proba = Array1::<f64>::zeros(classes.len());
    for (column, &code) in classes.iter().enumerate() {
        proba[code] = native[column];
    }

    let predicted = *proba.get(class_code).ok_or_else(|| {
        PredictionError::ModelInference(format!(
            "{} predicted unknown class code {}",
            classifier.name(),
            class_code
        ))
    })?;
    let best = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if predicted < best {
        return Err(PredictionError::ModelInference(format!(
            "{} predicted class {} (p = {}) but another class has p = {}",
            classifier.name(),
            class_code,
            predicted,
            best
        )));
    }

    log::debug!("Predicted class {} with probabilities {:?}", class_code, proba);
    Ok((class_code, proba))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_aligned() {
        assert!(check_class_alignment(&[2, 0, 1], 3).is_ok());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(check_class_alignment(&[0, 1], 3).is_err());
    }

    #[test]
    fn duplicate_and_out_of_range_codes_are_rejected() {
        assert!(check_class_alignment(&[0, 0], 2).is_err());
        assert!(check_class_alignment(&[0, 2], 2).is_err());
    }
}
