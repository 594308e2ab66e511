use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::processing::ratio::RatioParams;
use crate::error::{Error, Result};
use crate::types::{
    BoundaryMode, Contamination, DetectorKind, FilterSize, NanPolicy, SmoothingDomain,
};

/// Detection parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Local averaging window applied before the ratio is formed
    pub filter_size: FilterSize,
    /// Expected fraction of changed pixels, in (0, 0.5)
    pub contamination: f64,
    /// Seed for the randomized tree construction
    pub seed: u64,
    pub detector: DetectorKind,
    /// Number of isolation trees
    pub n_estimators: usize,
    /// Sub-sample size per tree (capped by the number of valid pixels)
    pub max_samples: usize,
    pub domain: SmoothingDomain,
    pub boundary: BoundaryMode,
    pub nan_policy: NanPolicy,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            filter_size: FilterSize::default(),
            contamination: Contamination::DEFAULT,
            seed: 0,
            detector: DetectorKind::IsolationForest,
            n_estimators: 100,
            max_samples: 256,
            domain: SmoothingDomain::Amplitude,
            boundary: BoundaryMode::Nearest,
            nan_policy: NanPolicy::Reject,
        }
    }
}

impl DetectionParams {
    /// Check the shape-independent preconditions.
    pub fn validate(&self) -> Result<()> {
        if self.filter_size.rows == 0 || self.filter_size.cols == 0 {
            return Err(Error::invalid(
                "filter_size",
                self.filter_size,
                "dimensions must be >= 1",
            ));
        }
        Contamination::new(self.contamination)?;
        if self.n_estimators == 0 {
            return Err(Error::invalid("n_estimators", self.n_estimators, "must be >= 1"));
        }
        if self.max_samples == 0 {
            return Err(Error::invalid("max_samples", self.max_samples, "must be >= 1"));
        }
        Ok(())
    }

    pub fn contamination(&self) -> Result<Contamination> {
        Contamination::new(self.contamination)
    }

    pub fn ratio_params(&self) -> RatioParams {
        RatioParams {
            filter_size: self.filter_size,
            domain: self.domain,
            boundary: self.boundary,
            nan_policy: self.nan_policy,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: DetectionParams = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
