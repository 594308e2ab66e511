use gdal::raster::ResampleAlg;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors encountered in the GDAL raster layer
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Band index {index} out of range (raster has {bands} bands)")]
    BandOutOfRange { index: usize, bands: usize },
    #[error("Dimension mismatch: expected {0}x{1}, got {2} samples")]
    DimensionMismatch(usize, usize, usize),
}

/// Georeferencing and layout of a GDAL-supported raster
#[derive(Debug, Clone)]
pub struct RasterMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection, `EPSG:<code>` when an authority is found, WKT otherwise
    pub projection: String,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

impl RasterMetadata {
    /// Shape as `(rows, cols)`, matching ndarray's convention
    pub fn shape(&self) -> (usize, usize) {
        (self.size_y, self.size_x)
    }

    /// True when the geotransform carries no georeferencing
    pub fn has_identity_transform(&self) -> bool {
        self.geotransform == IDENTITY_GEOTRANSFORM
    }
}

pub const IDENTITY_GEOTRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Reader for one acquisition (GeoTIFF, ENVI, NetCDF, ...) via GDAL
pub struct GdalRasterReader {
    pub path: PathBuf,
    pub dataset: Dataset,
    pub metadata: RasterMetadata,
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    let start = wkt.rfind(KEY)? + KEY.len();
    let end = wkt[start..].find('"')?;
    Some(format!("EPSG:{}", &wkt[start..start + end]))
}

impl GdalRasterReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset.geo_transform().unwrap_or(IDENTITY_GEOTRANSFORM);
        let mut proj = dataset.projection();
        if proj.is_empty() {
            // Fallback to GCP projection if available
            if let Some(gcp_proj) = dataset.gcp_projection() {
                proj = gcp_proj;
            }
        }
        let projection = match parse_epsg(&proj) {
            Some(code) if !proj.starts_with("EPSG:") => code,
            _ => proj,
        };
        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        debug!(
            "Opened {:?}: {}x{} px, {} band(s), projection={}",
            path.as_ref(),
            size_x,
            size_y,
            bands,
            if projection.is_empty() { "none" } else { &projection }
        );
        Ok(GdalRasterReader {
            path: path.as_ref().to_path_buf(),
            dataset,
            metadata: RasterMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                metadata: metadata_map,
            },
        })
    }

    /// Read the amplitude of a single band (1-based index) as an f64 array of shape
    /// (height, width): `|z|` for complex (SLC) bands, `|x|` for real ones.
    ///
    /// The band is read through an in-memory VRT applying GDAL's `mod` pixel
    /// function, since a plain Float64 read of a complex band keeps only the real part.
    pub fn read_amplitude(&self, index: usize) -> Result<Array2<f64>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::BandOutOfRange {
                index,
                bands: self.metadata.bands,
            });
        }
        let vrt = modulus_vrt(&self.path, &self.metadata, index);
        let modulus = Dataset::open(Path::new(&vrt))?;
        let band = modulus.rasterband(1)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>((0, 0), window, window, Some(ResampleAlg::NearestNeighbour))?;
        let data_vec = buf.data().to_vec();
        let samples = data_vec.len();
        Array2::from_shape_vec(self.metadata.shape(), data_vec).map_err(|_| {
            GdalError::DimensionMismatch(self.metadata.size_y, self.metadata.size_x, samples)
        })
    }
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// VRT document exposing `|band|` of `source` as a Float64 band. Sources are
/// transferred as CFloat64 so complex samples reach the pixel function intact.
fn modulus_vrt(source: &Path, meta: &RasterMetadata, band: usize) -> String {
    format!(
        concat!(
            r#"<VRTDataset rasterXSize="{cols}" rasterYSize="{rows}">"#,
            r#"<VRTRasterBand dataType="Float64" band="1" subClass="VRTDerivedRasterBand">"#,
            "<PixelFunctionType>mod</PixelFunctionType>",
            "<SourceTransferType>CFloat64</SourceTransferType>",
            "<SimpleSource>",
            r#"<SourceFilename relativeToVRT="0">{path}</SourceFilename>"#,
            "<SourceBand>{band}</SourceBand>",
            "</SimpleSource>",
            "</VRTRasterBand>",
            "</VRTDataset>"
        ),
        cols = meta.size_x,
        rows = meta.size_y,
        path = xml_escape(&source.to_string_lossy()),
        band = band,
    )
}
