//! GeoTIFF reader tests against files produced with the `tiff` encoder.

mod common;

use std::fs::File;
use std::io::{BufWriter, Cursor};

use raster_common::Crs;
use raster_h3::{read_geotiff, read_geotiff_from, ConversionError, RasterSource};
use test_utils::{assert_approx_eq, create_test_grid, raster, ScratchDir};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::TiffEncoder;
use tiff::tags::{PhotometricInterpretation, SampleFormat, Tag};

/// Five interleaved 8-bit samples per pixel, beyond what the decoder maps
/// to a color type.
struct FiveBand8;

impl ColorType for FiveBand8 {
    type Inner = u8;
    const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::BlackIsZero;
    const BITS_PER_SAMPLE: &'static [u16] = &[8; 5];
    const SAMPLE_FORMAT: &'static [SampleFormat] = &[SampleFormat::Uint; 5];
}

fn georeferenced<C: ColorType>(width: u32, height: u32, data: &[C::Inner]) -> Cursor<Vec<u8>>
where
    [C::Inner]: tiff::encoder::TiffValue,
{
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<C>(width, height).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0][..])
            .unwrap();
        image.write_data(data).unwrap();
    }
    buf.set_position(0);
    buf
}

#[test]
fn test_reads_float_band_with_georeferencing() {
    let scratch = ScratchDir::new();
    let spec = raster::UTM_TILE;
    let data = create_test_grid(spec.width, spec.height);
    let path = scratch.file("utm.tif");
    common::write_geotiff(&path, &spec, &data, Some(-9999.0), Some(spec.epsg));

    let band = read_geotiff(&path, 1).unwrap();
    assert_eq!(band.width(), spec.width);
    assert_eq!(band.height(), spec.height);
    assert_eq!(band.crs(), Some(&Crs::Epsg(32633)));
    assert_eq!(band.nodata(), Some(-9999.0));
    assert_eq!(band.data(), &data[..]);

    let (x, y) = band.geo_transform().pixel_center(0, 0);
    assert_approx_eq!(x, spec.pixel_center(0, 0).0, 1e-9);
    assert_approx_eq!(y, spec.pixel_center(0, 0).1, 1e-9);
}

#[test]
fn test_geographic_geokey() {
    let scratch = ScratchDir::new();
    let spec = raster::SRTM_TILE;
    let path = scratch.file("srtm.tif");
    common::write_geotiff(&path, &spec, &vec![0.0; spec.pixel_count()], None, Some(4326));

    let band = read_geotiff(&path, 1).unwrap();
    assert_eq!(band.crs(), Some(&Crs::Epsg(4326)));
    assert_eq!(band.nodata(), None);
}

#[test]
fn test_missing_geokeys_leaves_crs_unset() {
    let scratch = ScratchDir::new();
    let spec = raster::TINY_WGS84;
    let path = scratch.file("plain.tif");
    common::write_geotiff(&path, &spec, &[1.0; 4], None, None);

    let band = read_geotiff(&path, 1).unwrap();
    assert!(band.crs().is_none());
}

#[test]
fn test_integer_samples_are_widened() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<colortype::Gray16>(3, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 10.0, 50.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::GdalNodata, "65535")
            .unwrap();
        image.write_data(&[1u16, 2, 3, 4, 5, 65535]).unwrap();
    }
    buf.set_position(0);

    let band = read_geotiff_from(buf, 1).unwrap();
    assert_eq!(band.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 65535.0]);
    assert!(band.is_nodata(band.data()[5]));
}

#[test]
fn test_selects_interleaved_band() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<colortype::RGB8>(2, 1).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0][..])
            .unwrap();
        image.write_data(&[10u8, 20, 30, 11, 21, 31]).unwrap();
    }

    buf.set_position(0);
    let green = read_geotiff_from(buf.clone(), 2).unwrap();
    assert_eq!(green.data(), &[20.0, 21.0]);

    let out_of_range = read_geotiff_from(buf, 4);
    assert!(matches!(out_of_range, Err(ConversionError::Source(_))));
}

#[test]
fn test_selects_fourth_band_of_rgba() {
    let buf = georeferenced::<colortype::RGBA8>(2, 1, &[10, 20, 30, 40, 11, 21, 31, 41]);

    let alpha = read_geotiff_from(buf.clone(), 4).unwrap();
    assert_eq!(alpha.data(), &[40.0, 41.0]);

    assert!(matches!(
        read_geotiff_from(buf, 5),
        Err(ConversionError::Source(_))
    ));
}

#[test]
fn test_five_sample_image_is_rejected() {
    let data: Vec<u8> = (0..20).collect();
    let buf = georeferenced::<FiveBand8>(2, 2, &data);

    assert!(matches!(
        read_geotiff_from(buf, 1),
        Err(ConversionError::Source(_))
    ));
}

#[test]
fn test_model_transformation_tag() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<colortype::Gray32Float>(2, 2).unwrap();
        #[rustfmt::skip]
        let matrix = [
            0.5, 0.0, 0.0, 100.0,
            0.0, -0.5, 0.0, 200.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(Tag::ModelTransformationTag, &matrix[..])
            .unwrap();
        image.write_data(&[1.0f32, 2.0, 3.0, 4.0]).unwrap();
    }
    buf.set_position(0);

    let band = read_geotiff_from(buf, 1).unwrap();
    let (x, y) = band.geo_transform().pixel_center(1, 1);
    assert_approx_eq!(x, 100.75, 1e-12);
    assert_approx_eq!(y, 199.25, 1e-12);
}

#[test]
fn test_pixel_is_point_shifts_origin() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<colortype::Gray32Float>(2, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 10.0, 20.0, 0.0][..])
            .unwrap();
        // GTRasterType = PixelIsPoint, geographic WGS84
        let keys: [u16; 12] = [1, 1, 0, 2, 1025, 0, 1, 2, 2048, 0, 1, 4326];
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])
            .unwrap();
        image.write_data(&[0.0f32; 4]).unwrap();
    }
    buf.set_position(0);

    let band = read_geotiff_from(buf, 1).unwrap();
    // The tie point is the center of pixel (0, 0)
    let (x, y) = band.geo_transform().pixel_center(0, 0);
    assert_approx_eq!(x, 10.0, 1e-12);
    assert_approx_eq!(y, 20.0, 1e-12);
}

#[test]
fn test_ungeoreferenced_tiff_is_rejected() {
    let scratch = ScratchDir::new();
    let path = scratch.file("plain.tif");
    {
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::Gray8>(2, 2, &[0u8, 1, 2, 3])
            .unwrap();
    }

    let result = read_geotiff(&path, 1);
    assert!(matches!(result, Err(ConversionError::Source(_))));
}

#[test]
fn test_missing_file_is_source_error() {
    let result = read_geotiff("/nonexistent/dir/x.tif", 1);
    match result {
        Err(ConversionError::Source(msg)) => assert!(msg.contains("x.tif")),
        other => panic!("unexpected result: {:?}", other),
    }
}
