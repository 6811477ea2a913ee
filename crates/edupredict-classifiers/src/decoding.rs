use crate::bundle::ArtifactBundle;
use crate::error::{PredictionError, Result};

/// Human-readable outcome label for a label-encoder class code.
pub fn decode(bundle: &ArtifactBundle, class_code: usize) -> Result<&str> {
    let labels = bundle.label_encoder();
    labels.decode(class_code).ok_or_else(|| {
        PredictionError::Schema(format!(
            "class code {} is outside the label encoder's {} labels",
            class_code,
            labels.len()
        ))
    })
}

/// Outcome labels aligned with a reconciled probability vector of length
/// `n_probabilities`.
pub fn decode_all(bundle: &ArtifactBundle, n_probabilities: usize) -> Result<&[String]> {
    let labels = bundle.label_encoder().classes();
    if labels.len() != n_probabilities {
        return Err(PredictionError::Schema(format!(
            "label encoder has {} labels but the classifier returned {} probabilities",
            labels.len(),
            n_probabilities
        )));
    }
    Ok(labels)
}
