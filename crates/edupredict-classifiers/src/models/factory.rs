use serde::{Deserialize, Serialize};

use crate::error::BundleLoadError;
use crate::models::classifier_trait::Classifier;
use crate::models::forest::ForestClassifier;
use crate::models::logistic::LogisticClassifier;

/// Serialized classifier as stored in the artifact bundle, tagged by family.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Logistic(LogisticClassifier),
    Forest(ForestClassifier),
}

impl ClassifierSpec {
    pub fn family(&self) -> &'static str {
        match self {
            ClassifierSpec::Logistic(_) => "logistic",
            ClassifierSpec::Forest(_) => "forest",
        }
    }
}

/// Validate a serialized classifier and box it behind `Classifier`.
pub fn build_classifier(
    spec: ClassifierSpec,
) -> Result<Box<dyn Classifier + Send + Sync>, BundleLoadError> {
    match spec {
        ClassifierSpec::Logistic(model) => {
            model.validate()?;
            Ok(Box::new(model))
        }
        ClassifierSpec::Forest(model) => {
            model.validate()?;
            Ok(Box::new(model))
        }
    }
}
