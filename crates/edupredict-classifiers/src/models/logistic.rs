use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{BundleLoadError, PredictionError, Result};
use crate::models::classifier_trait::{check_input_width, Classifier};

/// Multinomial logistic regression.
///
/// `coefficients` holds one row per class. A single row with two classes is
/// the binary form: the row scores `classes[1]` against `classes[0]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LogisticClassifier {
    pub classes: Vec<usize>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LogisticClassifier {
    fn is_binary(&self) -> bool {
        self.coefficients.len() == 1 && self.classes.len() == 2
    }

    pub(crate) fn validate(&self) -> Result<(), BundleLoadError> {
        let incompatible = |msg: String| Err(BundleLoadError::Incompatible(msg));

        if self.classes.len() < 2 {
            return incompatible(format!(
                "logistic classifier needs at least 2 classes, has {}",
                self.classes.len()
            ));
        }
        let rows = self.coefficients.len();
        if !(self.is_binary() || rows == self.classes.len()) {
            return incompatible(format!(
                "logistic classifier has {} coefficient rows for {} classes",
                rows,
                self.classes.len()
            ));
        }
        if self.intercepts.len() != rows {
            return incompatible(format!(
                "logistic classifier has {} intercepts for {} coefficient rows",
                self.intercepts.len(),
                rows
            ));
        }
        let width = self.coefficients[0].len();
        if width == 0 || self.coefficients.iter().any(|r| r.len() != width) {
            return incompatible("logistic classifier coefficient rows are empty or ragged".to_string());
        }
        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return incompatible("logistic classifier contains non-finite weights".to_string());
        }
        Ok(())
    }

    fn decision_function(&self, x: &ArrayView1<f64>) -> Result<Vec<f64>> {
        let rows = self.coefficients.len();
        if !(self.is_binary() || rows == self.classes.len()) || self.intercepts.len() != rows {
            return Err(PredictionError::ModelInference(format!(
                "logistic classifier has {} coefficient rows and {} intercepts for {} classes",
                rows,
                self.intercepts.len(),
                self.classes.len()
            )));
        }
        if let Some(row) = self.coefficients.iter().find(|r| r.len() != x.len()) {
            return Err(PredictionError::ModelInference(format!(
                "logistic coefficient row has {} weights for {} features",
                row.len(),
                x.len()
            )));
        }
        Ok(self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| row.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect())
    }
}

impl Classifier for LogisticClassifier {
    fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        check_input_width(self, &x)?;
        let scores = self.decision_function(&x)?;

        if self.is_binary() {
            let p = sigmoid(scores[0]);
            return Ok(Array1::from(vec![1.0 - p, p]));
        }
        Ok(softmax(&scores))
    }

    fn name(&self) -> &str {
        "logistic classifier"
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Array1<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_class() -> LogisticClassifier {
        LogisticClassifier {
            classes: vec![0, 1, 2],
            coefficients: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]],
            intercepts: vec![0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn softmax_probabilities_sum_to_one() {
        let model = three_class();
        let p = model.predict_proba(array![2.0, -1.0].view()).unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(array![2.0, -1.0].view()).unwrap(), 0);
        assert_eq!(model.predict(array![-1.0, 2.0].view()).unwrap(), 1);
    }

    #[test]
    fn binary_form_uses_sigmoid() {
        let model = LogisticClassifier {
            classes: vec![0, 1],
            coefficients: vec![vec![1.0]],
            intercepts: vec![0.0],
        };
        model.validate().unwrap();
        let p = model.predict_proba(array![0.0].view()).unwrap();
        assert_eq!(p, array![0.5, 0.5]);
        let p = model.predict_proba(array![3.0].view()).unwrap();
        assert!(p[1] > 0.95);
        assert_eq!(model.predict(array![3.0].view()).unwrap(), 1);
    }

    #[test]
    fn large_scores_do_not_overflow() {
        let model = three_class();
        let p = model.predict_proba(array![1000.0, 999.0].view()).unwrap();
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wrong_width_is_inference_error() {
        let err = three_class().predict_proba(array![1.0].view()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelInference(_)));
    }

    #[test]
    fn ragged_rows_are_inference_errors() {
        let mut model = three_class();
        model.coefficients[2] = vec![0.0];
        let err = model.predict_proba(array![2.0, -1.0].view()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelInference(_)));

        let mut model = three_class();
        model.intercepts.pop();
        let err = model.predict_proba(array![2.0, -1.0].view()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelInference(_)));
    }

    #[test]
    fn validate_rejects_row_count_mismatch() {
        let mut model = three_class();
        model.coefficients.pop();
        model.intercepts.pop();
        assert!(model.validate().is_err());
    }
}
