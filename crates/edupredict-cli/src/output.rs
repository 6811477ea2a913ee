use std::fmt::Write;

use edupredict_classifiers::{ArtifactBundle, BundleLoadError, PredictionError, PredictionResult};

/// Short guidance shown under a prediction.
pub fn advice_for(label: &str) -> &'static str {
    match label {
        "Graduate" => {
            "Promising characteristics for academic success. Continued support and \
             engagement can help maintain this trajectory."
        }
        "Dropout" => {
            "There might be challenges ahead. Early intervention and additional support \
             could help the student stay on track."
        }
        _ => "The student's academic path needs careful monitoring. Personalised guidance might help.",
    }
}

pub fn render_prediction(result: &PredictionResult) -> String {
    let width = result
        .distribution
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "Predicted student status: {}", result.label);
    let _ = writeln!(out);
    let _ = writeln!(out, "Probability distribution:");
    for class in &result.distribution {
        let marker = if class.label == result.label { "*" } else { " " };
        let _ = writeln!(
            out,
            " {} {:<width$}  {:>6.2}%",
            marker,
            class.label,
            class.probability * 100.0,
            width = width
        );
    }
    let _ = writeln!(out);
    let _ = write!(out, "{}", advice_for(&result.label));
    out
}

pub fn render_bundle_summary(bundle: &ArtifactBundle) -> String {
    let meta = bundle.metadata();
    let mut out = String::new();
    let _ = writeln!(out, "Name:        {}", meta.name.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Version:     {}", meta.version.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "Trained at:  {}",
        meta.trained_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(out, "Classifier:  {}", bundle.classifier().name());
    let _ = writeln!(out, "Scaler:      {}", bundle.scaler().name());
    let _ = writeln!(out, "Features:    {}", bundle.feature_order().join(", "));

    let mut names: Vec<&String> = bundle.categorical_encoders().keys().collect();
    names.sort();
    for name in names {
        if let Some(encoder) = bundle.categorical_encoder(name) {
            let _ = writeln!(out, "Encoder {}: {}", name, encoder.classes().join(", "));
        }
    }
    let _ = write!(out, "Outcomes:    {}", bundle.label_encoder().classes().join(", "));
    out
}

/// Classify a failure as bad input or bad deployment for the final log line.
pub fn failure_kind(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PredictionError>() {
            return if e.is_retryable() {
                "invalid input, correct it and retry"
            } else {
                "deployment error, the artifact bundle does not match this predictor"
            };
        }
        if cause.downcast_ref::<BundleLoadError>().is_some() {
            return "deployment error, the artifact bundle could not be loaded";
        }
    }
    "unexpected error"
}
