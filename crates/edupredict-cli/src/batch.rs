//! Batch scoring of request rows from a CSV/TSV file.
//!
//! Rows are scored in parallel against one shared, read-only bundle. A row
//! with bad input gets its error in the `error` column; a deployment failure
//! aborts the whole batch since every row would fail the same way.
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use edupredict_classifiers::validation::RequestLimits;
use edupredict_classifiers::{
    predict_with_distribution, ArtifactBundle, PredictionError, PredictionRequest, PredictionResult,
};
use rayon::prelude::*;

pub fn validate_tsv_or_csv_file(path: &Path) -> Result<()> {
    if delimiter_for(path).is_none() {
        anyhow::bail!("File must have a .tsv or .csv extension: {:?}", path);
    }
    if !path.exists() {
        anyhow::bail!("File does not exist: {:?}", path);
    }
    Ok(())
}

fn delimiter_for(path: &Path) -> Option<u8> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") => Some(b'\t'),
        Some("csv") => Some(b','),
        _ => None,
    }
}

pub fn read_requests(path: &Path) -> Result<Vec<PredictionRequest>> {
    validate_tsv_or_csv_file(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path).unwrap_or(b','))
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open input file: {:?}", path))?;

    reader
        .deserialize::<PredictionRequest>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Invalid request on data row {}", i + 1)))
        .collect()
}

pub type RowOutcome = std::result::Result<PredictionResult, PredictionError>;

/// Validate and score every request, preserving input order.
pub fn score_requests(
    bundle: &ArtifactBundle,
    limits: &RequestLimits,
    requests: &[PredictionRequest],
) -> Result<Vec<RowOutcome>> {
    let outcomes: Vec<RowOutcome> = requests
        .par_iter()
        .map(|request| {
            limits.validate(request)?;
            predict_with_distribution(bundle, request)
        })
        .collect();

    if let Some(err) = outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .find(|e| !e.is_retryable())
    {
        return Err(err.clone()).context("Batch aborted: the artifact bundle cannot score these requests");
    }
    Ok(outcomes)
}

pub fn write_outcomes<W: io::Write>(
    writer: W,
    labels: &[String],
    requests: &[PredictionRequest],
    outcomes: &[RowOutcome],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = [
        "marital_status",
        "age_at_enrollment",
        "admission_grade",
        "curricular_units_enrolled",
        "gender",
        "predicted_status",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(labels.iter().map(|l| format!("p_{}", l)));
    header.push("error".to_string());
    wtr.write_record(&header)?;

    for (request, outcome) in requests.iter().zip(outcomes) {
        let mut record = vec![
            request.marital_status.clone(),
            request.age_at_enrollment.to_string(),
            request.admission_grade.to_string(),
            request.curricular_units_enrolled.to_string(),
            request.gender.clone(),
        ];
        match outcome {
            Ok(result) => {
                record.push(result.label.clone());
                record.extend(labels.iter().map(|l| {
                    result
                        .probability_of(l)
                        .map(|p| format!("{:.6}", p))
                        .unwrap_or_default()
                }));
                record.push(String::new());
            }
            Err(err) => {
                record.push(String::new());
                record.extend(labels.iter().map(|_| String::new()));
                record.push(err.to_string());
            }
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Score `input` and write the results to `output`, or stdout when `None`.
pub fn run_batch(
    bundle: &ArtifactBundle,
    limits: &RequestLimits,
    input: &Path,
    output: Option<&PathBuf>,
) -> Result<usize> {
    let requests = read_requests(input)?;
    log::info!("Loaded {} requests from {:?}", requests.len(), input);

    let outcomes = score_requests(bundle, limits, &requests)?;
    let rejected = outcomes.iter().filter(|o| o.is_err()).count();
    if rejected > 0 {
        log::warn!("{} of {} rows were rejected as invalid input", rejected, requests.len());
    }

    let labels = bundle.label_encoder().classes();
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_outcomes(file, labels, &requests, &outcomes)?;
            log::info!("Wrote predictions to {:?}", path);
        }
        None => write_outcomes(io::stdout().lock(), labels, &requests, &outcomes)?,
    }
    Ok(requests.len() - rejected)
}
