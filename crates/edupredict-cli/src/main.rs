use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use edupredict_classifiers::config::PredictorConfig;
use edupredict_classifiers::{predict_with_distribution, ArtifactBundle};
use edupredict_cli::batch::run_batch;
use edupredict_cli::input::{load_predictor_config, request_from_matches};
use edupredict_cli::output::{failure_kind, render_bundle_summary, render_prediction};

fn bundle_arg() -> Arg {
    Arg::new("bundle")
        .short('b')
        .long("bundle")
        .help("Path to the JSON artifact bundle. Overrides bundle_path from the config file.")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Path to predictor JSON configuration file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("EDUPREDICT_LOG", "error,edupredict=info"))
        .init();

    let matches = Command::new("edupredict")
        .version(clap::crate_version!())
        .about("\u{1F393} Predict a student's academic outcome from a trained artifact bundle")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("predict")
                .about("Predict the outcome of a single student")
                .arg(
                    Arg::new("marital_status")
                        .long("marital-status")
                        .help("Marital status, exactly as known to the bundle (e.g. 'single')")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("age")
                        .long("age")
                        .help("Age at enrollment")
                        .required(true)
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("admission_grade")
                        .long("admission-grade")
                        .help("Admission grade (0-20)")
                        .required(true)
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("units")
                        .long("units")
                        .help("Curricular units enrolled in the first semester")
                        .required(true)
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("gender")
                        .long("gender")
                        .help("Gender, exactly as known to the bundle (e.g. 'female')")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the prediction and distribution as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(bundle_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("batch")
                .about("Score every row of a CSV/TSV file of student records")
                .arg(
                    Arg::new("input")
                        .help("Input file with columns marital_status, age_at_enrollment, admission_grade, curricular_units_enrolled, gender")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the scored CSV. Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(bundle_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the contents of an artifact bundle")
                .arg(bundle_arg())
                .arg(config_arg()),
        )
        .get_matches();

    let outcome = match matches.subcommand() {
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("batch", sub_m)) => handle_batch(sub_m),
        Some(("inspect", sub_m)) => handle_inspect(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = outcome {
        log::error!("[EduPredict] Failed ({}): {:#}", failure_kind(&e), e);
        std::process::exit(1);
    }
    Ok(())
}

fn load_setup(matches: &ArgMatches) -> Result<(PredictorConfig, ArtifactBundle)> {
    let config = load_predictor_config(matches.get_one::<PathBuf>("config"), matches)?;
    let bundle = ArtifactBundle::load(&config.bundle_path)
        .with_context(|| format!("Cannot start without a valid bundle at {:?}", config.bundle_path))?;
    Ok((config, bundle))
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let request = request_from_matches(matches)?;
    let config = load_predictor_config(matches.get_one::<PathBuf>("config"), matches)?;
    config.limits.validate(&request)?;

    let bundle = ArtifactBundle::load(&config.bundle_path)
        .with_context(|| format!("Cannot start without a valid bundle at {:?}", config.bundle_path))?;
    let result = predict_with_distribution(&bundle, &request)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_prediction(&result));
    }
    Ok(())
}

fn handle_batch(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches.get_one("input").context("input file is required")?;
    let output: Option<&PathBuf> = matches.get_one("output_file");
    let (config, bundle) = load_setup(matches)?;

    let scored = run_batch(&bundle, &config.limits, input, output)?;
    log::info!("[EduPredict] Completed scoring {} records.", scored);
    Ok(())
}

fn handle_inspect(matches: &ArgMatches) -> Result<()> {
    let (_, bundle) = load_setup(matches)?;
    println!("{}", render_bundle_summary(&bundle));
    Ok(())
}
