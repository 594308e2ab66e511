//! Raster pair on disk -> Int16 GeoTIFF change map + JSON sidecar.
#![cfg(feature = "gdal")]

use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager, Metadata};
use ndarray::Array2;
use sarcd::{DetectionParams, Error, GdalRasterReader, process_pair_to_path};

const GEOTRANSFORM: [f64; 6] = [500_000.0, 10.0, 0.0, 4_600_000.0, 0.0, -10.0];

fn write_f32_raster(path: &Path, data: &Array2<f64>, geotransform: Option<[f64; 6]>) {
    let (rows, cols) = data.dim();
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver
        .create_with_band_type::<f32, _>(path, cols, rows, 1)
        .unwrap();
    if let Some(gt) = geotransform {
        ds.set_geo_transform(&gt).unwrap();
    }
    let mut buf = Buffer::new((cols, rows), data.iter().map(|&v| v as f32).collect());
    ds.rasterband(1)
        .unwrap()
        .write((0, 0), (cols, rows), &mut buf)
        .unwrap();
}

fn scene_pair(dir: &Path, geotransform: Option<[f64; 6]>) -> (std::path::PathBuf, std::path::PathBuf) {
    let before = Array2::from_elem((40, 48), 1.0);
    let mut after = before.clone();
    for r in 20..23 {
        for c in 30..33 {
            after[[r, c]] *= 10.0;
        }
    }
    let first = dir.join("t0.tif");
    let second = dir.join("t1.tif");
    write_f32_raster(&first, &before, geotransform);
    write_f32_raster(&second, &after, geotransform);
    (first, second)
}

#[test]
fn change_map_carries_labels_georeferencing_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scene_pair(dir.path(), Some(GEOTRANSFORM));
    let output = dir.path().join("change.tif");

    let summary =
        process_pair_to_path(&first, &second, &output, &DetectionParams::default(), 1, true)
            .unwrap();
    assert_eq!((summary.rows, summary.cols), (40, 48));
    assert_eq!(summary.appearance, 25);
    assert_eq!(summary.disappearance, 0);

    let ds = Dataset::open(&output).unwrap();
    assert_eq!(ds.raster_size(), (48, 40));
    assert_eq!(ds.geo_transform().unwrap(), GEOTRANSFORM);
    assert_eq!(ds.metadata_item("CHANGE_DETECTOR", "").as_deref(), Some("isolation-forest"));

    let band = ds.rasterband(1).unwrap();
    let buf = band.read_as::<i16>((0, 0), (48, 40), (48, 40), None).unwrap();
    // pixel (21, 31) sits inside the raised block
    assert_eq!(buf.data()[21 * 48 + 31], 1);

    let sidecar: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("change.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(sidecar["summary"]["appearance"], summary.appearance);
    assert_eq!(sidecar["geotransform"][1], 10.0);
}

#[test]
fn pixel_space_inputs_stay_in_pixel_space() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scene_pair(dir.path(), None);
    let output = dir.path().join("change.tif");

    process_pair_to_path(&first, &second, &output, &DetectionParams::default(), 1, false)
        .unwrap();
    assert!(!dir.path().join("change.json").exists());

    let reader = GdalRasterReader::open(&output).unwrap();
    assert!(reader.metadata.has_identity_transform());
}

#[test]
fn band_out_of_range_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scene_pair(dir.path(), None);
    let output = dir.path().join("change.tif");

    let err = process_pair_to_path(&first, &second, &output, &DetectionParams::default(), 2, false)
        .unwrap_err();
    assert!(matches!(err, Error::Gdal(_)));

    let err = process_pair_to_path(&first, &second, &output, &DetectionParams::default(), 0, false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { param: "band", .. }));
}

/// CFloat32 raster assembled from real and imaginary planes with the `complex` pixel function
fn write_cfloat32_raster(dir: &Path, re: &Array2<f64>, im: &Array2<f64>) -> std::path::PathBuf {
    let (rows, cols) = re.dim();
    let parts = dir.join("parts.tif");
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver
        .create_with_band_type::<f32, _>(&parts, cols, rows, 2)
        .unwrap();
    for (index, plane) in [(1, re), (2, im)] {
        let mut buf = Buffer::new((cols, rows), plane.iter().map(|&v| v as f32).collect());
        ds.rasterband(index)
            .unwrap()
            .write((0, 0), (cols, rows), &mut buf)
            .unwrap();
    }
    drop(ds);

    let source = |band: usize| {
        format!(
            r#"<SimpleSource><SourceFilename relativeToVRT="1">parts.tif</SourceFilename><SourceBand>{band}</SourceBand></SimpleSource>"#
        )
    };
    let vrt = format!(
        r#"<VRTDataset rasterXSize="{cols}" rasterYSize="{rows}"><VRTRasterBand dataType="CFloat32" band="1" subClass="VRTDerivedRasterBand"><PixelFunctionType>complex</PixelFunctionType>{}{}</VRTRasterBand></VRTDataset>"#,
        source(1),
        source(2)
    );
    let path = dir.join("slc.vrt");
    std::fs::write(&path, vrt).unwrap();
    path
}

#[test]
fn complex_bands_are_read_as_their_modulus() {
    let dir = tempfile::tempdir().unwrap();
    let mut re = Array2::from_elem((6, 5), 3.0);
    let im = Array2::from_elem((6, 5), 4.0);
    re[[2, 1]] = -3.0;
    let slc = write_cfloat32_raster(dir.path(), &re, &im);

    let reader = GdalRasterReader::open(&slc).unwrap();
    assert_eq!(reader.metadata.shape(), (6, 5));

    // a plain real read drops the imaginary part
    let raw = reader
        .dataset
        .rasterband(1)
        .unwrap()
        .read_as::<f64>((0, 0), (5, 6), (5, 6), None)
        .unwrap();
    assert_eq!(raw.data()[0], 3.0);

    let amplitude = reader.read_amplitude(1).unwrap();
    assert_eq!(amplitude.dim(), (6, 5));
    for &v in amplitude.iter() {
        assert!((v - 5.0).abs() < 1e-6, "got {v}");
    }
}

#[test]
fn real_bands_are_read_as_absolute_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = Array2::from_elem((4, 4), 2.5);
    data[[1, 3]] = -7.0;
    let path = dir.path().join("signed.tif");
    write_f32_raster(&path, &data, None);

    let amplitude = GdalRasterReader::open(&path).unwrap().read_amplitude(1).unwrap();
    assert_eq!(amplitude[[0, 0]], 2.5);
    assert_eq!(amplitude[[1, 3]], 7.0);
    assert!(matches!(
        GdalRasterReader::open(&path).unwrap().read_amplitude(2),
        Err(sarcd::GdalError::BandOutOfRange { index: 2, bands: 1 })
    ));
}
