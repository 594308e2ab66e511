use gdal::raster::{Buffer, ColorInterpretation};
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::path::Path;

use crate::io::GdalError;

/// Write change labels as a single-band Int16 GeoTIFF.
///
/// Returns the open dataset so georeferencing and metadata can be attached
/// before it is flushed on drop.
pub fn write_change_map_tiff(output: &Path, labels: &Array2<i8>) -> Result<Dataset, GdalError> {
    let (rows, cols) = labels.dim();
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let ds = driver.create_with_band_type::<i16, _>(output, cols, rows, 1)?;

    // Row-major order matches GDAL's line-by-line buffer layout
    let data: Vec<i16> = labels.iter().map(|&l| i16::from(l)).collect();
    let mut buf = Buffer::new((cols, rows), data);
    let mut band = ds.rasterband(1)?;
    band.set_color_interpretation(ColorInterpretation::GrayIndex)?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(ds)
}
