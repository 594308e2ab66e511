#![doc = r#"
sarcd — unsupervised change detection between two co-registered SAR acquisitions.

Given two amplitude images of the same scene taken at different times, sarcd labels
every pixel as appearance (+1), disappearance (-1) or no change (0). The pipeline is:

1. local averaging of each acquisition with a uniform (box) window,
2. a per-pixel arithmetic-mean / geometric-mean ratio of the smoothed values, which
   is exactly 1 where nothing changed and grows with the size of the change,
3. an Isolation Forest over the ratio values, thresholded so that roughly
   `contamination` of the pixels are flagged,
4. the sign of the smoothed difference splitting flagged pixels into
   appearance and disappearance.

No training data, calibration or geocoding is required. Results are deterministic
for a given seed.

Requirements
------------
- Rust 2024 edition toolchain.
- For the default `gdal` feature (raster I/O and the CLI): GDAL development headers
  and runtime available on your system.

Add dependency
--------------
```toml
[dependencies]
sarcd = "0.1"
# in-memory detection only, no GDAL:
# sarcd = { version = "0.1", default-features = false }
```

Quick start: in-memory detection
--------------------------------
```rust
use ndarray::Array2;
use sarcd::detect_change;

fn main() -> sarcd::Result<()> {
    let before = Array2::<f64>::from_elem((64, 64), 1.0);
    let mut after = before.clone();
    after[[30, 30]] = 40.0;

    let labels = detect_change(&before, &after, (3, 3), 0.02)?;
    assert_eq!(labels.dim(), (64, 64));
    assert_eq!(labels[[30, 30]], 1);
    Ok(())
}
```

Full parameter set and summary
------------------------------
```rust
use ndarray::Array2;
use sarcd::{detect_change_with_params, DetectionParams, DetectorKind, FilterSize, NanPolicy};

fn main() -> sarcd::Result<()> {
    let before = Array2::<f64>::from_elem((32, 32), 2.0);
    let after = before.clone();

    let params = DetectionParams {
        filter_size: FilterSize::new(5, 5),
        contamination: 0.05,
        seed: 42,
        detector: DetectorKind::IsolationForest,
        nan_policy: NanPolicy::Mask,
        ..Default::default()
    };
    let map = detect_change_with_params(&before, &after, &params)?;
    assert_eq!(map.summary.appearance + map.summary.disappearance, 0);
    Ok(())
}
```

Raster pair to GeoTIFF (feature `gdal`)
---------------------------------------
```rust,no_run
# #[cfg(feature = "gdal")]
# fn main() -> sarcd::Result<()> {
use std::path::Path;
use sarcd::{process_pair_to_path, DetectionParams};

let summary = process_pair_to_path(
    Path::new("/data/2023-06-01.tif"),
    Path::new("/data/2023-06-13.tif"),
    Path::new("/out/change.tif"),
    &DetectionParams::default(),
    1,    // band
    true, // write /out/change.json
)?;
println!("{} pixels appeared", summary.appearance);
# Ok(())
# }
# #[cfg(not(feature = "gdal"))]
# fn main() {}
```

Error handling
--------------
All public functions return `sarcd::Result<T>`. Preconditions are checked before any
computation:

```rust
use ndarray::Array2;
use sarcd::{detect_change, Error};

let a = Array2::<f64>::zeros((10, 10));
let b = Array2::<f64>::zeros((10, 12));
match detect_change(&a, &b, (3, 3), 0.02) {
    Err(Error::ShapeMismatch { first, second }) => {
        assert_eq!((first, second), ((10, 10), (10, 12)));
    }
    other => panic!("unexpected: {other:?}"),
}
```

Useful modules
--------------
- [`api`] — high-level entry points.
- [`core`] — ratio statistic, anomaly detectors and classification.
- [`types`] — parameter types and enums (e.g. `FilterSize`, `Contamination`, `ChangeClass`).
- [`io`] — GDAL reader and change-map writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::DetectionParams;
pub use error::{Error, Result};
pub use types::{
    BoundaryMode, ChangeClass, Contamination, DetectorKind, FilterSize, NanPolicy,
    SmoothingDomain,
};

// Building blocks
pub use core::anomaly::{AnomalyDetector, AnomalyFlags, IsolationForest, RobustZScore};
pub use core::classify::{ClassifiedChanges, classify_changes};
pub use core::processing::filter::uniform_filter;
pub use core::processing::ratio::{RatioParams, RatioStatistic, compute_ratio_statistic};

// Readers and writers
#[cfg(feature = "gdal")]
pub use io::{GdalError, GdalRasterReader, RasterMetadata};
pub use io::writers::metadata::change_metadata_fields;
pub use io::writers::sidecar::create_change_sidecar;
#[cfg(feature = "gdal")]
pub use io::writers::{metadata::embed_change_metadata, tiff::write_change_map_tiff};

// High-level API re-exports
#[cfg(feature = "gdal")]
pub use api::process_pair_to_path;
pub use api::{
    ChangeMap, ChangeSummary, detect_change, detect_change_complex, detect_change_with_params,
};
