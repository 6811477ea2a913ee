use ndarray::{Array1, ArrayView1};

use crate::error::{PredictionError, Result};

/// Contract every pre-trained classifier in a bundle satisfies. The pipeline
/// only talks to this trait, so the concrete model family stays hidden.
pub trait Classifier {
    /// Width of the feature vector the model was trained on.
    fn n_features(&self) -> usize;

    /// Label-encoder codes of the probability columns, in the model's native
    /// column order. Not assumed to match the label encoder's order.
    fn classes(&self) -> &[usize];

    /// Probability per class, one entry per `classes()` column.
    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>>;

    /// Predicted class code (a member of `classes()`).
    fn predict(&self, x: ArrayView1<f64>) -> Result<usize> {
        let proba = self.predict_proba(x)?;
        let column = argmax(proba.view()).ok_or_else(|| {
            PredictionError::ModelInference(format!("{} produced no probabilities", self.name()))
        })?;
        self.classes().get(column).copied().ok_or_else(|| {
            PredictionError::ModelInference(format!(
                "{} produced {} probabilities for {} classes",
                self.name(),
                proba.len(),
                self.classes().len()
            ))
        })
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Index of the largest value; the first one wins ties. `None` for an empty
/// vector or when any value is NaN.
pub fn argmax(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

pub(crate) fn check_input_width(model: &dyn Classifier, x: &ArrayView1<f64>) -> Result<()> {
    if x.len() != model.n_features() {
        return Err(PredictionError::ModelInference(format!(
            "{} expects {} features, got {}",
            model.name(),
            model.n_features(),
            x.len()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(PredictionError::ModelInference(format!(
            "{} received a non-finite feature value",
            model.name()
        )));
    }
    Ok(())
}
