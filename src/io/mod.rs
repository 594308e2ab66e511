//! I/O collaborators around the detection core: the GDAL `raster` reader for the
//! two acquisitions and `writers` for the change-map GeoTIFF, embedded metadata
//! and the JSON sidecar.
#[cfg(feature = "gdal")]
pub mod raster;
#[cfg(feature = "gdal")]
pub use raster::{GdalError, GdalRasterReader, RasterMetadata};

pub mod writers;
