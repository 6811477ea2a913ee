//! Shared fixtures: hand-built bundles with stub components that count calls.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use edupredict_classifiers::encoding::LabelEncoder;
use edupredict_classifiers::error::{PredictionError, Result};
use edupredict_classifiers::models::Classifier;
use edupredict_classifiers::preprocessing::FeatureScaler;
use edupredict_classifiers::ArtifactBundle;
use ndarray::{Array1, ArrayView1};

pub const FEATURE_ORDER: [&str; 5] = [
    "Admission_grade",
    "Age_at_enrollment",
    "Marital_status_encoded",
    "Gender_encoded",
    "Curricular_units_1st_sem_enrolled",
];

/// Classifier that ignores its input and always returns the same answer.
pub struct FixedClassifier {
    pub classes: Vec<usize>,
    pub proba: Vec<f64>,
    pub n_features: usize,
    pub calls: Arc<AtomicUsize>,
}

impl Classifier for FixedClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if x.len() != self.n_features {
            return Err(PredictionError::ModelInference(format!(
                "expected {} features, got {}",
                self.n_features,
                x.len()
            )));
        }
        Ok(Array1::from(self.proba.clone()))
    }
}

/// Scaler that passes values through unchanged.
pub struct IdentityScaler {
    pub n_features: usize,
    pub calls: Arc<AtomicUsize>,
}

impl FeatureScaler for IdentityScaler {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn scale(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(x.to_owned())
    }
}

pub struct Counters {
    pub scaler: Arc<AtomicUsize>,
    pub classifier: Arc<AtomicUsize>,
}

impl Counters {
    pub fn scaler_calls(&self) -> usize {
        self.scaler.load(Ordering::SeqCst)
    }

    pub fn classifier_calls(&self) -> usize {
        self.classifier.load(Ordering::SeqCst)
    }
}

pub fn encoders() -> HashMap<String, LabelEncoder> {
    let mut encoders = HashMap::new();
    encoders.insert(
        "marital_status".to_string(),
        LabelEncoder::new(["single", "married", "divorced", "widower", "facto union", "legally separated"]),
    );
    encoders.insert("gender".to_string(), LabelEncoder::new(["male", "female"]));
    encoders
}

pub fn feature_order() -> Vec<String> {
    FEATURE_ORDER.iter().map(|s| s.to_string()).collect()
}

/// Bundle whose classifier always answers with `proba` over `classes`.
pub fn fixed_bundle(labels: &[&str], classes: Vec<usize>, proba: Vec<f64>) -> (ArtifactBundle, Counters) {
    fixed_bundle_with_order(labels, classes, proba, feature_order())
}

pub fn fixed_bundle_with_order(
    labels: &[&str],
    classes: Vec<usize>,
    proba: Vec<f64>,
    feature_order: Vec<String>,
) -> (ArtifactBundle, Counters) {
    let counters = Counters {
        scaler: Arc::new(AtomicUsize::new(0)),
        classifier: Arc::new(AtomicUsize::new(0)),
    };
    let classifier = FixedClassifier {
        classes,
        proba,
        n_features: 5,
        calls: Arc::clone(&counters.classifier),
    };
    let scaler = IdentityScaler {
        n_features: feature_order.len(),
        calls: Arc::clone(&counters.scaler),
    };
    let bundle = ArtifactBundle::from_parts(
        Box::new(classifier),
        encoders(),
        LabelEncoder::new(labels.iter().copied()),
        Box::new(scaler),
        feature_order,
    );
    (bundle, counters)
}

/// Bundle around an arbitrary classifier, with an identity scaler and the
/// default feature order.
pub fn bundle_with_classifier(
    labels: &[&str],
    classifier: Box<dyn Classifier + Send + Sync>,
) -> (ArtifactBundle, Counters) {
    let counters = Counters {
        scaler: Arc::new(AtomicUsize::new(0)),
        classifier: Arc::new(AtomicUsize::new(0)),
    };
    let scaler = IdentityScaler {
        n_features: FEATURE_ORDER.len(),
        calls: Arc::clone(&counters.scaler),
    };
    let bundle = ArtifactBundle::from_parts(
        classifier,
        encoders(),
        LabelEncoder::new(labels.iter().copied()),
        Box::new(scaler),
        feature_order(),
    );
    (bundle, counters)
}

/// Bundle JSON with a real three-class logistic model and standard scaler.
pub fn logistic_bundle_json() -> serde_json::Value {
    serde_json::json!({
        "metadata": { "name": "student-status", "version": "1", "trained_at": "2024-11-02T10:00:00Z" },
        "classifier": {
            "type": "logistic",
            "classes": [0, 1, 2],
            "coefficients": [
                [-0.8, 0.4, 0.1, 0.2, -0.6],
                [0.1, 0.0, 0.0, 0.0, 0.1],
                [0.7, -0.4, -0.1, -0.2, 0.5]
            ],
            "intercepts": [-0.2, -0.5, 0.3]
        },
        "categorical_encoders": {
            "marital_status": { "classes": ["divorced", "facto union", "legally separated", "married", "single", "widower"] },
            "gender": { "classes": ["female", "male"] }
        },
        "label_encoder": { "classes": ["Dropout", "Enrolled", "Graduate"] },
        "scaler": {
            "type": "standard",
            "mean": [12.6, 23.3, 3.8, 0.35, 6.3],
            "scale": [1.4, 7.6, 0.9, 0.48, 2.5]
        },
        "feature_order": FEATURE_ORDER
    })
}

/// Bundle JSON with a two-tree forest split on admission grade.
pub fn forest_bundle_json() -> serde_json::Value {
    let tree = |left: [f64; 2], right: [f64; 2]| {
        serde_json::json!({
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, 0, 0],
            "threshold": [0.0, -2.0, -2.0],
            "value": [[0.0, 0.0], left, right]
        })
    };
    serde_json::json!({
        "classifier": {
            "type": "forest",
            "classes": [1, 0],
            "n_features": 5,
            "trees": [tree([2.0, 8.0], [9.0, 1.0]), tree([4.0, 6.0], [7.0, 3.0])]
        },
        "categorical_encoders": {
            "marital_status": { "classes": ["married", "single"] },
            "gender": { "classes": ["female", "male"] }
        },
        "label_encoder": { "classes": ["Dropout", "Graduate"] },
        "scaler": {
            "type": "min_max",
            "data_min": [0.0, 15.0, 0.0, 0.0, 1.0],
            "data_max": [20.0, 70.0, 1.0, 1.0, 20.0],
            "feature_range": [-1.0, 1.0]
        },
        "feature_order": FEATURE_ORDER
    })
}
