//! Fitted feature scalers.
//!
//! Scalers arrive already fitted inside the artifact bundle; this module only
//! applies them. Both scalers operate column-wise on a vector laid out in the
//! bundle's feature order.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{BundleLoadError, PredictionError, Result};

/// Fitted transform from original units to model units.
pub trait FeatureScaler {
    /// Number of columns the scaler was fitted on.
    fn n_features(&self) -> usize;

    fn scale(&self, x: ArrayView1<f64>) -> Result<Array1<f64>>;

    fn name(&self) -> &str {
        "scaler"
    }
}

fn check_width(
    scaler: &dyn FeatureScaler,
    x: &ArrayView1<f64>,
    params: &[(&str, &[f64])],
) -> Result<()> {
    if x.len() != scaler.n_features() {
        return Err(PredictionError::Schema(format!(
            "{} was fitted on {} features but received {}",
            scaler.name(),
            scaler.n_features(),
            x.len()
        )));
    }
    for (field, values) in params {
        if values.len() != x.len() {
            return Err(PredictionError::Schema(format!(
                "{} field '{}' has {} entries for {} features",
                scaler.name(),
                field,
                values.len(),
                x.len()
            )));
        }
    }
    Ok(())
}

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn scale(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        check_width(self, &x, &[("mean", self.mean.as_slice()), ("scale", self.scale.as_slice())])?;
        Ok(x
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&v, (&m, &s))| (v - m) / non_zero(s))
            .collect())
    }

    fn name(&self) -> &str {
        "standard scaler"
    }
}

/// Per-column min/max rescaling into `feature_range`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl FeatureScaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.data_min.len()
    }

    fn scale(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        check_width(
            self,
            &x,
            &[("data_min", self.data_min.as_slice()), ("data_max", self.data_max.as_slice())],
        )?;
        let (lo, hi) = self.feature_range;
        Ok(x
            .iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(&v, (&min, &max))| (v - min) / non_zero(max - min) * (hi - lo) + lo)
            .collect())
    }

    fn name(&self) -> &str {
        "min-max scaler"
    }
}

// Constant columns were fitted with zero spread; leave them unscaled.
#[inline]
fn non_zero(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

/// Serialized scaler as stored in the artifact bundle.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalerSpec {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

/// Validate a serialized scaler and box it behind `FeatureScaler`.
pub fn build_scaler(spec: ScalerSpec) -> Result<Box<dyn FeatureScaler + Send + Sync>, BundleLoadError> {
    match spec {
        ScalerSpec::Standard(sc) => {
            check_columns("standard scaler", &[("mean", &sc.mean), ("scale", &sc.scale)])?;
            Ok(Box::new(sc))
        }
        ScalerSpec::MinMax(sc) => {
            check_columns(
                "min-max scaler",
                &[("data_min", &sc.data_min), ("data_max", &sc.data_max)],
            )?;
            let (lo, hi) = sc.feature_range;
            if lo.is_nan() || hi.is_nan() || lo >= hi {
                return Err(BundleLoadError::Incompatible(format!(
                    "min-max scaler feature_range ({}, {}) is empty",
                    lo, hi
                )));
            }
            Ok(Box::new(sc))
        }
    }
}

fn check_columns(name: &str, columns: &[(&str, &Vec<f64>)]) -> Result<(), BundleLoadError> {
    let width = columns[0].1.len();
    if width == 0 {
        return Err(BundleLoadError::Incompatible(format!("{} has no columns", name)));
    }
    for (field, values) in columns {
        if values.len() != width {
            return Err(BundleLoadError::Incompatible(format!(
                "{} field '{}' has {} entries, expected {}",
                name,
                field,
                values.len(),
                width
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BundleLoadError::Incompatible(format!(
                "{} field '{}' contains non-finite values",
                name, field
            )));
        }
    }
    Ok(())
}
