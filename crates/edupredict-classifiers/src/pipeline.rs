//! Single-record inference: encode → assemble and scale → predict → decode.
//!
//! Every stage either succeeds or ends the call with a typed error; there
//! are no partial results and no fallback predictions. Both the dashboard
//! and the standalone predictor call into these functions.
use serde::{Deserialize, Serialize};

use crate::bundle::ArtifactBundle;
use crate::decoding::{decode, decode_all};
use crate::error::Result;
use crate::features::{assemble, PredictionRequest};
use crate::predictor::predict;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: String,
    pub class_code: usize,
    /// One entry per outcome, in label-encoder order.
    pub distribution: Vec<ClassProbability>,
}

impl PredictionResult {
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.distribution
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.probability)
    }
}

/// Predict the outcome and the full probability distribution for one request.
pub fn predict_with_distribution(
    bundle: &ArtifactBundle,
    request: &PredictionRequest,
) -> Result<PredictionResult> {
    let scaled = assemble(bundle, request)?;
    let (class_code, proba) = predict(bundle, &scaled)?;

    let label = decode(bundle, class_code)?.to_string();
    let labels = decode_all(bundle, proba.len())?;
    let distribution = labels
        .iter()
        .zip(proba.iter())
        .map(|(label, &probability)| ClassProbability {
            label: label.clone(),
            probability,
        })
        .collect();

    Ok(PredictionResult {
        label,
        class_code,
        distribution,
    })
}

/// Predicted outcome label for one request.
pub fn predict_request(bundle: &ArtifactBundle, request: &PredictionRequest) -> Result<String> {
    predict_with_distribution(bundle, request).map(|result| result.label)
}

/// Predicted outcome label from raw field values.
pub fn predict_student_status(
    bundle: &ArtifactBundle,
    marital_status: &str,
    age: u32,
    admission_grade: f64,
    curricular_units_enrolled: u32,
    gender: &str,
) -> Result<String> {
    let request = PredictionRequest::new(
        marital_status,
        age,
        admission_grade,
        curricular_units_enrolled,
        gender,
    );
    predict_request(bundle, &request)
}
