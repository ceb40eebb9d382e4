//! HEIC/HEIF decode via libheif.
//!
//! Only compiled with the `heif` feature; requires the native libheif
//! library. Produces the same `DecodedImage` shape as the image-rs path,
//! including the raw EXIF blob and ICC profile when the container has them.

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use std::path::Path;

use crate::error::PipelineError;

use super::{DecodedImage, ImageMetadata};

pub(crate) fn decode(bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
    let decode_err = |message: String| PipelineError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_bytes(bytes).map_err(|e| decode_err(e.to_string()))?;
    let handle = context
        .primary_image_handle()
        .map_err(|e| decode_err(e.to_string()))?;

    let has_alpha = handle.has_alpha_channel();
    let chroma = if has_alpha {
        RgbChroma::Rgba
    } else {
        RgbChroma::Rgb
    };
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(|e| decode_err(e.to_string()))?;

    let width = decoded.width();
    let height = decoded.height();
    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| decode_err("missing interleaved plane".to_string()))?;

    // Rows may be padded to the stride; copy them out tightly packed
    let channels: usize = if has_alpha { 4 } else { 3 };
    let row_len = width as usize * channels;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * interleaved.stride;
        pixels.extend_from_slice(&interleaved.data[start..start + row_len]);
    }

    let image = if has_alpha {
        RgbaImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| decode_err("plane size mismatch".to_string()))?
    } else {
        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| decode_err("plane size mismatch".to_string()))?
    };

    Ok(DecodedImage {
        image,
        width,
        height,
        meta: read_metadata(&handle),
    })
}

fn read_metadata(handle: &libheif_rs::ImageHandle) -> ImageMetadata {
    // The Exif metadata block starts with a 4-byte offset to the TIFF header
    let exif = handle
        .all_metadata()
        .into_iter()
        .find(|block| block.item_type == "Exif")
        .map(|block| {
            if block.raw_data.len() > 4 {
                block.raw_data[4..].to_vec()
            } else {
                block.raw_data
            }
        });

    let icc = handle.color_profile_raw().map(|profile| profile.data);

    ImageMetadata { exif, icc }
}
