//! The trained artifact bundle: classifier, encoders, scaler and feature
//! order, produced offline and loaded once at startup.
//!
//! `ArtifactBundle` is immutable after construction and `Send + Sync`, so a
//! single instance can serve concurrent prediction requests without locking.
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoding::LabelEncoder;
use crate::error::BundleLoadError;
use crate::features;
use crate::models::factory::{build_classifier, ClassifierSpec};
use crate::models::Classifier;
use crate::predictor::check_class_alignment;
use crate::preprocessing::{build_scaler, FeatureScaler, ScalerSpec};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct BundleMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

/// On-disk layout of a bundle. Every component is optional here so that a
/// missing one is reported by name instead of as a generic parse failure.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BundleFile {
    #[serde(default)]
    pub metadata: BundleMetadata,
    pub classifier: Option<ClassifierSpec>,
    pub categorical_encoders: Option<HashMap<String, LabelEncoder>>,
    pub label_encoder: Option<LabelEncoder>,
    pub scaler: Option<ScalerSpec>,
    pub feature_order: Option<Vec<String>>,
}

pub struct ArtifactBundle {
    metadata: BundleMetadata,
    classifier: Box<dyn Classifier + Send + Sync>,
    categorical_encoders: HashMap<String, LabelEncoder>,
    label_encoder: LabelEncoder,
    scaler: Box<dyn FeatureScaler + Send + Sync>,
    feature_order: Vec<String>,
}

impl ArtifactBundle {
    /// Assemble a bundle from already-built components. Shape agreement
    /// between the parts is not checked here; mismatches surface as typed
    /// errors at prediction time. Use [`ArtifactBundle::load`] for bundles
    /// coming from disk.
    pub fn from_parts(
        classifier: Box<dyn Classifier + Send + Sync>,
        categorical_encoders: HashMap<String, LabelEncoder>,
        label_encoder: LabelEncoder,
        scaler: Box<dyn FeatureScaler + Send + Sync>,
        feature_order: Vec<String>,
    ) -> Self {
        ArtifactBundle {
            metadata: BundleMetadata::default(),
            classifier,
            categorical_encoders,
            label_encoder,
            scaler,
            feature_order,
        }
    }

    pub fn with_metadata(mut self, metadata: BundleMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Read, parse and validate a JSON bundle.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BundleLoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BundleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: BundleFile =
            serde_json::from_str(&text).map_err(|source| BundleLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let bundle = Self::from_file(file)?;
        log::info!(
            "Loaded artifact bundle {:?} ({} v{}, {}, {} features, outcomes {:?})",
            path,
            bundle.metadata.name.as_deref().unwrap_or("unnamed"),
            bundle.metadata.version.as_deref().unwrap_or("?"),
            bundle.classifier.name(),
            bundle.feature_order.len(),
            bundle.label_encoder.classes()
        );
        if let Some(trained_at) = bundle.metadata.trained_at {
            log::debug!("Bundle trained at {}", trained_at.to_rfc3339());
        }
        Ok(bundle)
    }

    /// Validate a parsed bundle file and build the runtime bundle from it.
    pub fn from_file(file: BundleFile) -> Result<Self, BundleLoadError> {
        let classifier = file.classifier.ok_or_else(|| missing("classifier"))?;
        let categorical_encoders = file
            .categorical_encoders
            .ok_or_else(|| missing("categorical_encoders"))?;
        let label_encoder = file.label_encoder.ok_or_else(|| missing("label_encoder"))?;
        let scaler = file.scaler.ok_or_else(|| missing("scaler"))?;
        let feature_order = file.feature_order.ok_or_else(|| missing("feature_order"))?;

        check_encoder("label_encoder", &label_encoder)?;
        for feature in features::CATEGORICAL_FEATURES {
            let encoder = categorical_encoders
                .get(feature.encoder)
                .ok_or_else(|| missing(&format!("categorical_encoders.{}", feature.encoder)))?;
            check_encoder(feature.encoder, encoder)?;
        }

        if feature_order.is_empty() {
            return Err(BundleLoadError::Incompatible("feature_order is empty".to_string()));
        }
        for (i, name) in feature_order.iter().enumerate() {
            if feature_order[..i].contains(name) {
                return Err(BundleLoadError::Incompatible(format!(
                    "feature_order lists '{}' more than once",
                    name
                )));
            }
            if !features::is_model_feature(name) {
                return Err(BundleLoadError::Incompatible(format!(
                    "feature_order names '{}', which the pipeline cannot produce",
                    name
                )));
            }
        }

        log::debug!("Building {} classifier from bundle", classifier.family());
        let classifier = build_classifier(classifier)?;
        let scaler = build_scaler(scaler)?;

        if classifier.n_features() != feature_order.len() {
            return Err(BundleLoadError::Incompatible(format!(
                "{} expects {} features but feature_order has {}",
                classifier.name(),
                classifier.n_features(),
                feature_order.len()
            )));
        }
        if scaler.n_features() != feature_order.len() {
            return Err(BundleLoadError::Incompatible(format!(
                "{} was fitted on {} features but feature_order has {}",
                scaler.name(),
                scaler.n_features(),
                feature_order.len()
            )));
        }
        check_class_alignment(classifier.classes(), label_encoder.len())
            .map_err(BundleLoadError::Incompatible)?;

        Ok(
            Self::from_parts(classifier, categorical_encoders, label_encoder, scaler, feature_order)
                .with_metadata(file.metadata),
        )
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    pub fn classifier(&self) -> &(dyn Classifier + Send + Sync) {
        self.classifier.as_ref()
    }

    pub fn categorical_encoder(&self, feature: &str) -> Option<&LabelEncoder> {
        self.categorical_encoders.get(feature)
    }

    pub fn categorical_encoders(&self) -> &HashMap<String, LabelEncoder> {
        &self.categorical_encoders
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn scaler(&self) -> &(dyn FeatureScaler + Send + Sync) {
        self.scaler.as_ref()
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("metadata", &self.metadata)
            .field("classifier", &self.classifier.name())
            .field("categorical_encoders", &self.categorical_encoders)
            .field("label_encoder", &self.label_encoder)
            .field("scaler", &self.scaler.name())
            .field("feature_order", &self.feature_order)
            .finish()
    }
}

fn missing(component: &str) -> BundleLoadError {
    BundleLoadError::MissingComponent(component.to_string())
}

fn check_encoder(name: &str, encoder: &LabelEncoder) -> Result<(), BundleLoadError> {
    if encoder.is_empty() {
        return Err(BundleLoadError::Incompatible(format!(
            "encoder '{}' has no classes",
            name
        )));
    }
    if let Some(dup) = encoder.first_duplicate() {
        return Err(BundleLoadError::Incompatible(format!(
            "encoder '{}' lists class '{}' more than once",
            name, dup
        )));
    }
    Ok(())
}
