//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use projection::GeoTransform;
use raster_common::Crs;
use raster_h3::RasterBand;
use test_utils::RasterSpec;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Build an in-memory band laid out as `spec`.
pub fn band(spec: &RasterSpec, data: Vec<f64>) -> RasterBand {
    RasterBand::new(
        data,
        spec.width,
        spec.height,
        GeoTransform::from_gdal(spec.gdal_transform()),
        Some(Crs::Epsg(spec.epsg)),
    )
    .unwrap()
}

/// GeoKey directory declaring `epsg` as the raster's CRS.
pub fn geokeys(epsg: u16, geographic: bool) -> Vec<u16> {
    let (model_type, crs_key) = if geographic { (2, 2048) } else { (1, 3072) };
    vec![
        1, 1, 0, 3, // header, 3 keys
        1024, 0, 1, model_type, // GTModelType
        1025, 0, 1, 1, // GTRasterType = PixelIsArea
        crs_key, 0, 1, epsg,
    ]
}

/// Write a single-band `f64` GeoTIFF for `spec`.
///
/// `epsg` of `None` omits the GeoKey directory.
pub fn write_geotiff(path: &Path, spec: &RasterSpec, data: &[f64], nodata: Option<f64>, epsg: Option<u16>) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder
        .new_image::<colortype::Gray64Float>(spec.width as u32, spec.height as u32)
        .unwrap();

    let scale = [spec.pixel_size, spec.pixel_size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, spec.west, spec.north, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .unwrap();

    if let Some(code) = epsg {
        let keys = geokeys(code, projection::is_geographic_crs(code));
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])
            .unwrap();
    }
    if let Some(value) = nodata {
        let text = format!("{}", value);
        image
            .encoder()
            .write_tag(Tag::GdalNodata, text.as_str())
            .unwrap();
    }

    image.write_data(data).unwrap();
}
