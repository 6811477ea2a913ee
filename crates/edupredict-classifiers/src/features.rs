//! Feature assembly: raw request → model-facing vector in bundle order.
//!
//! Numeric request fields are copied verbatim; categorical fields are encoded
//! first and then stand in under their `*_encoded` column name. The raw
//! categorical strings never reach the model. The ordered vector is then
//! passed through the bundle's fitted scaler.
use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::bundle::ArtifactBundle;
use crate::encoding::encode_categorical;
use crate::error::{PredictionError, Result};

pub const AGE_AT_ENROLLMENT: &str = "Age_at_enrollment";
pub const ADMISSION_GRADE: &str = "Admission_grade";
pub const CURRICULAR_UNITS_ENROLLED: &str = "Curricular_units_1st_sem_enrolled";

/// A categorical input: the bundle encoder that codes it and the model
/// column that carries the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoricalFeature {
    pub encoder: &'static str,
    pub column: &'static str,
}

pub const MARITAL_STATUS: CategoricalFeature = CategoricalFeature {
    encoder: "marital_status",
    column: "Marital_status_encoded",
};

pub const GENDER: CategoricalFeature = CategoricalFeature {
    encoder: "gender",
    column: "Gender_encoded",
};

pub const CATEGORICAL_FEATURES: [CategoricalFeature; 2] = [MARITAL_STATUS, GENDER];

pub const NUMERIC_FEATURES: [&str; 3] = [AGE_AT_ENROLLMENT, ADMISSION_GRADE, CURRICULAR_UNITS_ENROLLED];

/// Whether `name` is a column this pipeline can produce for the model.
pub fn is_model_feature(name: &str) -> bool {
    NUMERIC_FEATURES.contains(&name) || CATEGORICAL_FEATURES.iter().any(|f| f.column == name)
}

/// One student's raw inputs, as entered by a person.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub marital_status: String,
    pub age_at_enrollment: u32,
    pub admission_grade: f64,
    pub curricular_units_enrolled: u32,
    pub gender: String,
}

impl PredictionRequest {
    pub fn new(
        marital_status: impl Into<String>,
        age_at_enrollment: u32,
        admission_grade: f64,
        curricular_units_enrolled: u32,
        gender: impl Into<String>,
    ) -> Self {
        PredictionRequest {
            marital_status: marital_status.into(),
            age_at_enrollment,
            admission_grade,
            curricular_units_enrolled,
            gender: gender.into(),
        }
    }

    fn categorical_value(&self, feature: &CategoricalFeature) -> Result<&str> {
        match *feature {
            MARITAL_STATUS => Ok(&self.marital_status),
            GENDER => Ok(&self.gender),
            other => Err(PredictionError::Schema(format!(
                "request carries no value for categorical feature '{}'",
                other.encoder
            ))),
        }
    }
}

/// Build the ordered, unscaled feature vector for `request`.
///
/// Non-finite numerics are rejected and all categorical values are encoded
/// before anything else happens, so bad input fails before the scaler or
/// classifier is touched.
pub fn assemble_unscaled(bundle: &ArtifactBundle, request: &PredictionRequest) -> Result<Array1<f64>> {
    if !request.admission_grade.is_finite() {
        return Err(PredictionError::OutOfRange {
            field: "admission_grade",
            value: request.admission_grade.to_string(),
            min: format!("{:e}", f64::MIN),
            max: format!("{:e}", f64::MAX),
        });
    }

    let mut values: HashMap<&str, f64> = HashMap::with_capacity(5);
    for feature in &CATEGORICAL_FEATURES {
        let code = encode_categorical(bundle, feature.encoder, request.categorical_value(feature)?)?;
        values.insert(feature.column, code as f64);
    }
    values.insert(AGE_AT_ENROLLMENT, f64::from(request.age_at_enrollment));
    values.insert(ADMISSION_GRADE, request.admission_grade);
    values.insert(CURRICULAR_UNITS_ENROLLED, f64::from(request.curricular_units_enrolled));

    bundle
        .feature_order()
        .iter()
        .map(|name| {
            values
                .get(name.as_str())
                .copied()
                .ok_or_else(|| PredictionError::MissingFeature {
                    feature: name.clone(),
                })
        })
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from)
}

/// Build the ordered feature vector and apply the bundle's fitted scaler.
pub fn assemble(bundle: &ArtifactBundle, request: &PredictionRequest) -> Result<Array1<f64>> {
    let raw = assemble_unscaled(bundle, request)?;
    log::debug!("Assembled feature vector {:?} in order {:?}", raw, bundle.feature_order());
    bundle.scaler().scale(raw.view())
}
