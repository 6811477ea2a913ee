use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use edupredict_classifiers::config::PredictorConfig;
use edupredict_classifiers::PredictionRequest;

/// Load the predictor configuration, field by field, falling back to the
/// default for anything missing or invalid. CLI arguments override the file.
pub fn load_predictor_config(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<PredictorConfig> {
    let mut config = match config_path {
        Some(path) => read_config_file(path)?,
        None => {
            log::debug!("No config provided; using defaults.");
            PredictorConfig::default()
        }
    };

    if let Some(bundle) = matches.get_one::<PathBuf>("bundle") {
        config.bundle_path = bundle.clone();
    }
    Ok(config)
}

pub fn read_config_file(config_path: &Path) -> Result<PredictorConfig> {
    let config_json = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

    let partial: serde_json::Value = serde_json::from_str(&config_json)
        .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))?;
    let mut config = PredictorConfig::default();

    macro_rules! load_or_default {
        ($field:ident) => {
            if let Some(val) = partial.get(stringify!($field)) {
                if let Ok(parsed) = serde_json::from_value(val.clone()) {
                    config.$field = parsed;
                } else {
                    log::warn!(
                        "Config Invalid value for '{}', using default: {:?}",
                        stringify!($field),
                        config.$field
                    );
                }
            } else {
                log::warn!(
                    "Config Missing field '{}', using default: {:?}",
                    stringify!($field),
                    config.$field
                );
            }
        };
    }

    load_or_default!(bundle_path);
    load_or_default!(limits);

    Ok(config)
}

/// Build a request from the `predict` subcommand's arguments.
pub fn request_from_matches(matches: &ArgMatches) -> Result<PredictionRequest> {
    let marital_status = matches
        .get_one::<String>("marital_status")
        .context("--marital-status is required")?;
    let gender = matches.get_one::<String>("gender").context("--gender is required")?;
    let age = *matches.get_one::<u32>("age").context("--age is required")?;
    let admission_grade = *matches
        .get_one::<f64>("admission_grade")
        .context("--admission-grade is required")?;
    let units = *matches.get_one::<u32>("units").context("--units is required")?;

    Ok(PredictionRequest::new(
        marital_status.as_str(),
        age,
        admission_grade,
        units,
        gender.as_str(),
    ))
}
