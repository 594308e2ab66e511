//! Shared types and enums used across SARCD.
//! Includes `ChangeClass`, the validated `FilterSize` / `Contamination` wrappers, and
//! the selectable strategies `DetectorKind`, `SmoothingDomain`, `BoundaryMode` and
//! `NanPolicy`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-pixel change label. The discriminant is the value stored in the change map.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum ChangeClass {
    Disappearance = -1,
    NoChange = 0,
    Appearance = 1,
}

impl ChangeClass {
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Label an anomalous pixel from its directional value. Exact zero stays `NoChange`.
    pub fn from_direction(direction: f64) -> Self {
        if direction > 0.0 {
            ChangeClass::Appearance
        } else if direction < 0.0 {
            ChangeClass::Disappearance
        } else {
            ChangeClass::NoChange
        }
    }
}

impl std::fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeClass::Disappearance => write!(f, "Disappearance"),
            ChangeClass::NoChange => write!(f, "NoChange"),
            ChangeClass::Appearance => write!(f, "Appearance"),
        }
    }
}

/// Local averaging window `(rows, cols)`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FilterSize {
    pub rows: usize,
    pub cols: usize,
}

impl FilterSize {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Check the window against an image of shape `(rows, cols)`: both window
    /// dimensions must lie in `1..=min(rows, cols)`.
    pub fn validate_for(&self, shape: (usize, usize)) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::invalid("filter_size", self, "dimensions must be >= 1"));
        }
        let limit = shape.0.min(shape.1);
        if self.rows > limit || self.cols > limit {
            return Err(Error::invalid(
                "filter_size",
                self,
                "window dimensions must not exceed the shorter image side",
            ));
        }
        Ok(())
    }
}

impl Default for FilterSize {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl From<(usize, usize)> for FilterSize {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

impl std::fmt::Display for FilterSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl std::str::FromStr for FilterSize {
    type Err = String;

    /// Accepts `"5"` (square) or `"3x5"` / `"3,5"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid filter size '{}': expected N or RxC", s))
        };
        match s.split_once(|c: char| c == 'x' || c == 'X' || c == ',') {
            Some((r, c)) => Ok(Self::new(parse(r)?, parse(c)?)),
            None => {
                let n = parse(s)?;
                Ok(Self::new(n, n))
            }
        }
    }
}

/// Expected anomaly fraction, guaranteed to lie in the open interval (0, 0.5).
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Serialize)]
pub struct Contamination(f64);

impl Contamination {
    pub const DEFAULT: f64 = 0.02;

    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value < 0.5 {
            Ok(Self(value))
        } else {
            Err(Error::invalid(
                "contamination",
                value,
                "must lie in the open interval (0, 0.5)",
            ))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Contamination {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl std::fmt::Display for Contamination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorKind {
    IsolationForest,
    RobustZ,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::IsolationForest => write!(f, "IsolationForest"),
            DetectorKind::RobustZ => write!(f, "RobustZ"),
        }
    }
}

/// Quantity averaged by the spatial filter before the ratio is formed.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingDomain {
    /// Mean of `|x|`
    Amplitude,
    /// Mean of `|x|^2`
    Intensity,
}

impl std::fmt::Display for SmoothingDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmoothingDomain::Amplitude => write!(f, "Amplitude"),
            SmoothingDomain::Intensity => write!(f, "Intensity"),
        }
    }
}

/// Out-of-bounds sampling rule for the spatial filter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryMode {
    /// a a a | a b c d | d d d
    Nearest,
    /// c b a | a b c d | d c b
    Reflect,
}

impl std::fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryMode::Nearest => write!(f, "Nearest"),
            BoundaryMode::Reflect => write!(f, "Reflect"),
        }
    }
}

/// Handling of NaN / infinite input pixels.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NanPolicy {
    /// Fail with `Error::NonFiniteInput`
    Reject,
    /// Zero the pixel, exclude it from fitting and label it no-change
    Mask,
}

impl std::fmt::Display for NanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NanPolicy::Reject => write!(f, "Reject"),
            NanPolicy::Mask => write!(f, "Mask"),
        }
    }
}
