use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring an artifact bundle up at startup. Never recoverable at
/// request time: the service needs a correct bundle redeployed.
#[derive(Debug, Error)]
pub enum BundleLoadError {
    #[error("failed to read artifact bundle {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact bundle {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact bundle is missing required component '{0}'")]
    MissingComponent(String),
    #[error("artifact bundle is structurally incompatible: {0}")]
    Incompatible(String),
}

/// Whether a failed prediction is the caller's fault or the deployment's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; re-prompt with a corrected value.
    InvalidInput,
    /// Bundle and pipeline disagree, or the model misbehaved.
    Deployment,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("unknown {feature} category '{value}' (expected one of {expected:?})")]
    UnknownCategory {
        feature: String,
        value: String,
        expected: Vec<String>,
    },
    #[error("{field} = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("feature '{feature}' required by the bundle's feature order was not produced")]
    MissingFeature { feature: String },
    #[error("bundle schema mismatch: {0}")]
    Schema(String),
    #[error("classifier rejected the feature vector: {0}")]
    ModelInference(String),
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::UnknownCategory { .. } | PredictionError::OutOfRange { .. } => {
                ErrorKind::InvalidInput
            }
            PredictionError::MissingFeature { .. }
            | PredictionError::Schema(_)
            | PredictionError::ModelInference(_) => ErrorKind::Deployment,
        }
    }

    /// True when re-submitting corrected input can succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

pub type Result<T, E = PredictionError> = std::result::Result<T, E>;
