//! edupredict-classifiers: single-record student outcome inference.
//!
//! Turns raw, human-entered student fields into the feature vector a
//! pre-trained classifier expects, runs the classifier and decodes the
//! outcome label together with the per-class probability distribution. The
//! classifier, its encoders and its scaler come from an immutable artifact
//! bundle produced offline; nothing here fits or mutates them.
pub mod bundle;
pub mod config;
pub mod decoding;
pub mod encoding;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod preprocessing;
pub mod validation;

pub use bundle::ArtifactBundle;
pub use error::{BundleLoadError, ErrorKind, PredictionError};
pub use features::PredictionRequest;
pub use pipeline::{predict_request, predict_student_status, predict_with_distribution, PredictionResult};
