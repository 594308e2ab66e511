//! Output writers: the Int16 change-map GeoTIFF, embedded metadata items and the
//! JSON sidecar summary.
pub mod metadata;
pub mod sidecar;
#[cfg(feature = "gdal")]
pub mod tiff;
