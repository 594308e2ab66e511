use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use sarcd::DetectionParams;
use sarcd::api::process_pair_to_path;

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(log: bool) {
    if log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Start from the config file (or defaults) and apply every flag that was given.
pub fn build_params(args: &CliArgs) -> Result<DetectionParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            DetectionParams::from_json_file(path).map_err(|source| AppError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => DetectionParams::default(),
    };

    if let Some(filter_size) = args.filter_size {
        params.filter_size = filter_size;
    }
    if let Some(contamination) = args.contamination {
        params.contamination = contamination;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(detector) = args.detector {
        params.detector = detector;
    }
    if let Some(estimators) = args.estimators {
        params.n_estimators = estimators;
    }
    if let Some(max_samples) = args.max_samples {
        params.max_samples = max_samples;
    }
    if let Some(domain) = args.domain {
        params.domain = domain;
    }
    if let Some(boundary) = args.boundary {
        params.boundary = boundary;
    }
    if let Some(nan_policy) = args.nan_policy {
        params.nan_policy = nan_policy;
    }

    params.validate()?;
    Ok(params)
}

fn required(path: &Option<PathBuf>, arg: &str) -> Result<PathBuf, AppError> {
    path.clone().ok_or_else(|| AppError::MissingArgument {
        arg: arg.to_string(),
    })
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let first = required(&args.first, "--first")?;
    let second = required(&args.second, "--second")?;
    let output = required(&args.output, "--output")?;
    if args.band == 0 {
        return Err(AppError::InvalidBand { band: args.band }.into());
    }
    if first == second {
        return Err(AppError::SameInput { path: first }.into());
    }

    let params = build_params(&args)?;
    info!(
        "Detecting changes: {:?} -> {:?} (filter={}, contamination={}, detector={}, seed={})",
        first, second, params.filter_size, params.contamination, params.detector, params.seed
    );

    let summary = process_pair_to_path(
        &first,
        &second,
        &output,
        &params,
        args.band,
        !args.no_sidecar,
    )?;

    println!(
        "{}: {}x{} px, {} appearance, {} disappearance, {} unchanged, {} masked ({:.2}% changed)",
        output.display(),
        summary.rows,
        summary.cols,
        summary.appearance,
        summary.disappearance,
        summary.unchanged,
        summary.masked,
        100.0 * summary.changed_fraction()
    );
    Ok(())
}
