//! GeoTIFF reader.
//!
//! Decodes one band of a (Geo)TIFF into a [`RasterBand`]:
//!
//! - geo-transform from `ModelPixelScale` + `ModelTiepoint`, or from
//!   `ModelTransformation`
//! - CRS from the GeoKey directory (projected CS type, else geographic type)
//! - no-data sentinel from the GDAL_NODATA ASCII tag
//!
//! Samples of any integer or float format are widened to `f64`. Pixel-
//! interleaved images of up to four samples (gray-alpha, RGB, RGBA, CMYK)
//! can have any of their bands selected; other sample layouts are rejected.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use num_traits::ToPrimitive;
use projection::GeoTransform;
use raster_common::Crs;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use super::RasterBand;
use crate::error::{ConversionError, Result};

/// GeoKey IDs (GeoTIFF 1.1, section 7).
const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// GeoKey value for a user-defined (non-EPSG) definition.
const USER_DEFINED: u16 = 32767;

/// GTRasterTypeGeoKey value for PixelIsPoint rasters.
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Open a GeoTIFF file and read the 1-based `band`.
pub fn read_geotiff(path: impl AsRef<Path>, band: usize) -> Result<RasterBand> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ConversionError::source_error(format!("cannot open {}: {}", path.display(), e))
    })?;
    read_geotiff_from(BufReader::new(file), band)
        .map_err(|e| match e {
            ConversionError::Source(msg) => {
                ConversionError::source_error(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
}

/// Read the 1-based `band` of a GeoTIFF from any seekable reader.
pub fn read_geotiff_from<R: Read + Seek>(reader: R, band: usize) -> Result<RasterBand> {
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let color = decoder.colortype().map_err(|e| {
        ConversionError::source_error(format!("unsupported sample layout: {}", e))
    })?;
    let samples_per_pixel = samples_per_pixel(color);
    if band == 0 || band > samples_per_pixel {
        return Err(ConversionError::source_error(format!(
            "band {} requested but image has {} band(s)",
            band, samples_per_pixel
        )));
    }

    let planar = optional_u32(&mut decoder, Tag::PlanarConfiguration)?.unwrap_or(1);
    if planar != 1 && samples_per_pixel > 1 {
        return Err(ConversionError::source_error(
            "planar (band-separate) multi-band layout is not supported",
        ));
    }

    let geokeys = match decoder.find_tag(Tag::GeoKeyDirectoryTag)? {
        Some(value) => GeoKeys::parse(&value.into_u16_vec()?),
        None => GeoKeys::default(),
    };

    let mut transform = read_geo_transform(&mut decoder)?;
    if geokeys.raster_type == Some(RASTER_PIXEL_IS_POINT) {
        // Tie points refer to pixel centers; re-anchor to corners.
        transform = transform.shifted(-0.5, -0.5);
    }

    let crs = geokeys.crs()?;
    let nodata = read_nodata(&mut decoder)?;

    debug!(
        width,
        height,
        samples_per_pixel,
        band,
        crs = ?crs,
        nodata = ?nodata,
        "Decoding GeoTIFF band"
    );

    let image = decoder.read_image()?;
    let data = select_band(image, samples_per_pixel, band - 1);

    Ok(RasterBand::new(data, width, height, transform, crs)?.with_nodata(nodata))
}

fn samples_per_pixel(color: ColorType) -> usize {
    match color {
        ColorType::Gray(_) | ColorType::Palette(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) | ColorType::YCbCr(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
    }
}

fn optional_u32<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<u32>> {
    Ok(decoder.find_tag(tag)?.map(|v| v.into_u32()).transpose()?)
}

fn optional_f64_vec<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Vec<f64>>> {
    Ok(decoder.find_tag(tag)?.map(|v| v.into_f64_vec()).transpose()?)
}

fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Some(m) = optional_f64_vec(decoder, Tag::ModelTransformationTag)? {
        if m.len() < 8 {
            return Err(ConversionError::source_error(
                "ModelTransformation tag has fewer than 8 values",
            ));
        }
        return Ok(GeoTransform::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = optional_f64_vec(decoder, Tag::ModelPixelScaleTag)?;
    let tiepoint = optional_f64_vec(decoder, Tag::ModelTiepointTag)?;

    match (scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
            // Tie point maps raster (i, j) to model (x, y)
            let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
            let (sx, sy) = (scale[0], scale[1]);
            Ok(GeoTransform::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
        }
        (Some(_), Some(_)) => Err(ConversionError::source_error(
            "malformed ModelPixelScale/ModelTiepoint tags",
        )),
        _ => Err(ConversionError::source_error(
            "image is not georeferenced (no ModelTransformation or ModelPixelScale/ModelTiepoint)",
        )),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let text = text.trim_matches(char::from(0)).trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| ConversionError::source_error(format!("invalid GDAL_NODATA value '{}'", text)))
}

fn select_band(image: DecodingResult, samples_per_pixel: usize, band_index: usize) -> Vec<f64> {
    fn widen<T: ToPrimitive>(samples: &[T], stride: usize, offset: usize) -> Vec<f64> {
        samples
            .iter()
            .skip(offset)
            .step_by(stride)
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    let (stride, offset) = (samples_per_pixel, band_index);
    match image {
        DecodingResult::U8(v) => widen(&v, stride, offset),
        DecodingResult::U16(v) => widen(&v, stride, offset),
        DecodingResult::U32(v) => widen(&v, stride, offset),
        DecodingResult::U64(v) => widen(&v, stride, offset),
        DecodingResult::I8(v) => widen(&v, stride, offset),
        DecodingResult::I16(v) => widen(&v, stride, offset),
        DecodingResult::I32(v) => widen(&v, stride, offset),
        DecodingResult::I64(v) => widen(&v, stride, offset),
        DecodingResult::F32(v) => widen(&v, stride, offset),
        DecodingResult::F64(v) => widen(&v, stride, offset),
    }
}

/// The subset of the GeoKey directory the converter needs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GeoKeys {
    model_type: Option<u16>,
    raster_type: Option<u16>,
    geographic_type: Option<u16>,
    projected_type: Option<u16>,
}

impl GeoKeys {
    /// Parse a GeoKeyDirectory: a 4-short header followed by
    /// `(key_id, tag_location, count, value)` entries. Only inline short
    /// values (`tag_location == 0`) are read.
    fn parse(dir: &[u16]) -> Self {
        let mut keys = Self::default();
        if dir.len() < 4 {
            return keys;
        }
        let num_keys = dir[3] as usize;

        for entry in dir[4..].chunks_exact(4).take(num_keys) {
            let (key_id, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key_id {
                GT_MODEL_TYPE_KEY => keys.model_type = Some(value),
                GT_RASTER_TYPE_KEY => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE_KEY => keys.geographic_type = Some(value),
                PROJECTED_CS_TYPE_KEY => keys.projected_type = Some(value),
                _ => {}
            }
        }
        keys
    }

    /// Resolve the declared CRS. A projected CS type takes precedence.
    fn crs(&self) -> Result<Option<Crs>> {
        let code = match (self.projected_type, self.geographic_type) {
            (Some(p), _) if p != USER_DEFINED => p,
            (_, Some(g)) if g != USER_DEFINED => g,
            (Some(_), _) | (_, Some(_)) => {
                return Err(ConversionError::invalid_crs(
                    "user-defined GeoTIFF CRS is not supported; supply an EPSG override",
                ));
            }
            (None, None) => return Ok(None),
        };
        Ok(Some(Crs::Epsg(code)))
    }
}
