use clap::Parser;
use std::path::PathBuf;

use sarcd::types::{BoundaryMode, DetectorKind, FilterSize, NanPolicy, SmoothingDomain};

/// Flags left unset fall back to the `--config` file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(
    name = "sarcd",
    version,
    about = "Unsupervised change detection between two co-registered SAR acquisitions"
)]
pub struct CliArgs {
    /// Earlier acquisition (any GDAL-readable raster)
    #[arg(long)]
    pub first: Option<PathBuf>,

    /// Later acquisition, co-registered with --first
    #[arg(long)]
    pub second: Option<PathBuf>,

    /// Output change map (Int16 GeoTIFF: -1 disappearance, 0 no change, 1 appearance)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Smoothing window, e.g. 3x3, 5x7 or 5
    #[arg(long, value_parser = clap::value_parser!(FilterSize))]
    pub filter_size: Option<FilterSize>,

    /// Expected fraction of changed pixels, in (0, 0.5)
    #[arg(long)]
    pub contamination: Option<f64>,

    /// Seed for the randomized detector
    #[arg(long)]
    pub seed: Option<u64>,

    /// Anomaly detector (isolation-forest or robust-z)
    #[arg(long, value_enum)]
    pub detector: Option<DetectorKind>,

    /// Number of isolation trees
    #[arg(long)]
    pub estimators: Option<usize>,

    /// Sub-sample size per isolation tree
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Quantity smoothed before the ratio (amplitude or intensity)
    #[arg(long, value_enum)]
    pub domain: Option<SmoothingDomain>,

    /// Border handling for the smoothing window (nearest or reflect)
    #[arg(long, value_enum)]
    pub boundary: Option<BoundaryMode>,

    /// Non-finite pixels: reject the pair or mask them out
    #[arg(long, value_enum)]
    pub nan_policy: Option<NanPolicy>,

    /// Raster band to read from both inputs (1-based)
    #[arg(long, default_value_t = 1)]
    pub band: usize,

    /// JSON file with detection parameters
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the JSON sidecar next to the output
    #[arg(long, default_value_t = false)]
    pub no_sidecar: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
