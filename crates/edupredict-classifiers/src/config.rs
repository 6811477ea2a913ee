use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::validation::RequestLimits;

/// Runtime configuration for a predictor surface.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Location of the JSON artifact bundle, read once at startup.
    pub bundle_path: PathBuf,
    pub limits: RequestLimits,
}

impl PredictorConfig {
    pub fn new(bundle_path: impl Into<PathBuf>, limits: RequestLimits) -> Self {
        Self {
            bundle_path: bundle_path.into(),
            limits,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::new("model.json", RequestLimits::default())
    }
}
