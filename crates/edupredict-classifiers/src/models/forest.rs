use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{BundleLoadError, PredictionError, Result};
use crate::models::classifier_trait::{check_input_width, Classifier};

const LEAF: i64 = -1;

/// One fitted decision tree in flat array form. Node `i` splits on
/// `feature[i]` at `threshold[i]`; rows with `x <= threshold` go left.
/// Leaves have `children_left[i] == -1` and carry per-class weights in
/// `value[i]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<usize>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, index: usize, n_features: usize, n_classes: usize) -> Result<(), BundleLoadError> {
        let bad = |msg: String| Err(BundleLoadError::Incompatible(format!("tree {}: {}", index, msg)));

        let n = self.n_nodes();
        if n == 0 {
            return bad("has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return bad("node arrays have different lengths".to_string());
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return bad(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        weights.len(),
                        n_classes
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
                    return bad(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }
            // Children must point forward so traversal always terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return bad(format!("node {} has out-of-order child {}", node, child));
                }
            }
            if self.feature[node] >= n_features {
                return bad(format!(
                    "node {} splits on feature {} of {}",
                    node, self.feature[node], n_features
                ));
            }
            if self.threshold[node].is_nan() {
                return bad(format!("node {} has a NaN threshold", node));
            }
        }
        Ok(())
    }

    fn leaf_for(&self, x: &ArrayView1<f64>) -> Result<&[f64]> {
        let mut node = 0usize;
        // Bounded walk; a well-formed tree reaches a leaf in fewer steps.
        for _ in 0..=self.n_nodes() {
            let left = *self.children_left.get(node).ok_or_else(|| malformed(node))?;
            if left == LEAF {
                return self
                    .value
                    .get(node)
                    .map(Vec::as_slice)
                    .ok_or_else(|| malformed(node));
            }
            let feature = *self.feature.get(node).ok_or_else(|| malformed(node))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| malformed(node))?;
            let value = *x.get(feature).ok_or_else(|| malformed(node))?;
            let next = if value <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| malformed(node))?
            };
            node = usize::try_from(next).map_err(|_| malformed(node))?;
        }
        Err(PredictionError::ModelInference(
            "decision tree traversal did not reach a leaf".to_string(),
        ))
    }
}

fn malformed(node: usize) -> PredictionError {
    PredictionError::ModelInference(format!("decision tree node {} is malformed", node))
}

/// Averaging ensemble of decision trees (random forest / extra trees).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForestClassifier {
    pub classes: Vec<usize>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub(crate) fn validate(&self) -> Result<(), BundleLoadError> {
        if self.classes.len() < 2 {
            return Err(BundleLoadError::Incompatible(format!(
                "forest classifier needs at least 2 classes, has {}",
                self.classes.len()
            )));
        }
        if self.n_features == 0 {
            return Err(BundleLoadError::Incompatible(
                "forest classifier has no features".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(BundleLoadError::Incompatible(
                "forest classifier has no trees".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features, self.classes.len())?;
        }
        Ok(())
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        check_input_width(self, &x)?;
        if self.trees.is_empty() {
            return Err(PredictionError::ModelInference(
                "forest classifier has no trees".to_string(),
            ));
        }

        let mut proba = Array1::<f64>::zeros(self.classes.len());
        for tree in &self.trees {
            let weights = tree.leaf_for(&x)?;
            if weights.len() != proba.len() {
                return Err(PredictionError::ModelInference(format!(
                    "leaf has {} class weights for {} classes",
                    weights.len(),
                    proba.len()
                )));
            }
            let total: f64 = weights.iter().sum();
            for (p, w) in proba.iter_mut().zip(weights) {
                *p += w / total;
            }
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    fn name(&self) -> &str {
        "forest classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // Single split on feature 0 at 10.0: left leaf favours class 0.
    fn stump(left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![0, 0, 0],
            threshold: vec![10.0, 0.0, 0.0],
            value: vec![vec![0.0, 0.0], left, right],
        }
    }

    fn forest() -> ForestClassifier {
        ForestClassifier {
            classes: vec![0, 1],
            n_features: 2,
            trees: vec![
                stump(vec![8.0, 2.0], vec![1.0, 9.0]),
                stump(vec![6.0, 4.0], vec![3.0, 7.0]),
            ],
        }
    }

    #[test]
    fn averages_normalised_leaf_distributions() {
        let model = forest();
        let p = model.predict_proba(array![5.0, 0.0].view()).unwrap();
        assert!((p[0] - 0.7).abs() < 1e-12);
        assert!((p[1] - 0.3).abs() < 1e-12);
        assert_eq!(model.predict(array![5.0, 0.0].view()).unwrap(), 0);
        assert_eq!(model.predict(array![12.0, 0.0].view()).unwrap(), 1);
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let p = forest().predict_proba(array![10.0, 0.0].view()).unwrap();
        assert!(p[0] > p[1]);
    }

    #[test]
    fn short_node_arrays_are_inference_errors() {
        let mut model = forest();
        model.trees[0].value.truncate(1);
        let err = model.predict_proba(array![5.0, 0.0].view()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelInference(_)));

        let mut model = forest();
        model.trees[1].threshold.clear();
        let err = model.predict_proba(array![5.0, 0.0].view()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelInference(_)));
    }

    #[test]
    fn validate_accepts_well_formed_forest() {
        forest().validate().unwrap();
    }

    #[test]
    fn validate_rejects_backward_child() {
        let mut model = forest();
        model.trees[0].children_left[0] = 0;
        assert!(matches!(model.validate(), Err(BundleLoadError::Incompatible(_))));
    }

    #[test]
    fn validate_rejects_split_on_unknown_feature() {
        let mut model = forest();
        model.trees[1].feature[0] = 7;
        assert!(model.validate().is_err());
    }
}
