//! Default codec backed by the `image` crate.
//!
//! Pixel decode goes through `image` with content-based format detection;
//! EXIF and ICC blobs are read and embedded at the container level with
//! `img-parts`, so they pass through byte-identical. HEIF decode is
//! delegated to libheif when the `heif` feature is enabled.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, DynImage, ImageEXIF, ImageICC};
use std::io::Cursor;
use std::path::Path;

use crate::config::NormalizeConfig;
use crate::error::PipelineError;

use super::{DecodedImage, ImageCodec, ImageKind, ImageMetadata};

/// Codec built on `image` + `img-parts`.
pub struct ImageRsCodec {
    jpeg_quality: u8,
    large_image_threshold: u64,
}

impl ImageRsCodec {
    /// Create a codec with the given output policy settings.
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            large_image_threshold: config.large_image_threshold_bytes(),
        }
    }

    /// Pull EXIF/ICC blobs out of a JPEG or PNG container.
    ///
    /// Any parse failure is treated as "no metadata", never as an error.
    fn read_metadata(bytes: &[u8]) -> ImageMetadata {
        match DynImage::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(Some(container)) => ImageMetadata {
                exif: container.exif().map(|b| b.to_vec()),
                icc: container.icc_profile().map(|b| b.to_vec()),
            },
            _ => ImageMetadata::default(),
        }
    }

    fn encode_jpeg(
        &self,
        image: &DynamicImage,
        meta: &ImageMetadata,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let encode_err = |message: String| PipelineError::Encode {
            path: path.to_path_buf(),
            message,
        };

        // JPEG cannot carry alpha; flatten at this boundary only
        let rgb = image.to_rgb8();
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| encode_err(e.to_string()))?;

        if meta.exif.is_none() && meta.icc.is_none() {
            return Ok(buffer);
        }

        let mut jpeg =
            Jpeg::from_bytes(buffer.into()).map_err(|e| encode_err(e.to_string()))?;
        if let Some(exif) = &meta.exif {
            jpeg.set_exif(Some(Bytes::copy_from_slice(exif)));
        }
        if let Some(icc) = &meta.icc {
            jpeg.set_icc_profile(Some(Bytes::copy_from_slice(icc)));
        }
        Ok(jpeg.encoder().bytes().to_vec())
    }

    fn encode_png(
        &self,
        image: &DynamicImage,
        meta: &ImageMetadata,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let encode_err = |message: String| PipelineError::Encode {
            path: path.to_path_buf(),
            message,
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| encode_err(e.to_string()))?;
        let buffer = buffer.into_inner();

        // EXIF is only carried for JPEG outputs; ICC rides the iCCP chunk
        let Some(icc) = &meta.icc else {
            return Ok(buffer);
        };
        let mut png = Png::from_bytes(buffer.into()).map_err(|e| encode_err(e.to_string()))?;
        png.set_icc_profile(Some(Bytes::copy_from_slice(icc)));
        Ok(png.encoder().bytes().to_vec())
    }

    fn encode_plain(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
        if ImageKind::from_path(path) == Some(ImageKind::Heif) {
            return decode_heif(bytes, path);
        }

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let width = image.width();
        let height = image.height();
        Ok(DecodedImage {
            image,
            width,
            height,
            meta: Self::read_metadata(bytes),
        })
    }

    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> DynamicImage {
        // A decoded estimate above the threshold gets a cheap half-size
        // pre-shrink first; the final target size is unaffected.
        let estimate = image.width() as u64 * image.height() as u64 * 3;
        let image = if estimate > self.large_image_threshold {
            image.thumbnail(image.width() / 2, image.height() / 2)
        } else {
            image
        };
        image.resize_exact(width, height, FilterType::Lanczos3)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageKind,
        meta: &ImageMetadata,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        match format {
            ImageKind::Jpeg => self.encode_jpeg(image, meta, path),
            ImageKind::Png => self.encode_png(image, meta, path),
            // TIFF comes out uncompressed; these encoders carry no blobs
            ImageKind::Tiff => self.encode_plain(image, ImageFormat::Tiff, path),
            ImageKind::Bmp => self.encode_plain(image, ImageFormat::Bmp, path),
            ImageKind::Gif => self.encode_plain(image, ImageFormat::Gif, path),
            ImageKind::Heif => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "heif output".to_string(),
            }),
        }
    }
}

#[cfg(feature = "heif")]
fn decode_heif(bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
    super::heif::decode(bytes, path)
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
    Err(PipelineError::Decode {
        path: path.to_path_buf(),
        message: "HEIF decode support not enabled (build with the `heif` feature)".to_string(),
    })
}
