//! The image codec seam: decode, resize and encode behind a trait.
//!
//! The pipeline core never touches pixel formats or containers directly; it
//! talks to an [`ImageCodec`] and works in terms of opaque metadata blobs.
//! The default implementation lives in [`image_rs`] and is backed by the
//! `image` crate, with segment-level EXIF/ICC handling via `img-parts`.

pub mod image_rs;

#[cfg(feature = "heif")]
pub(crate) mod heif;

pub use image_rs::ImageRsCodec;

use image::DynamicImage;
use std::path::Path;

use crate::error::PipelineError;

/// Output/policy format, keyed off the file extension.
///
/// The save path follows the extension the file arrived with, mirroring the
/// per-extension encode options (JPEG quality, uncompressed TIFF). HEIF is
/// only ever a source format; the output policy rewrites it as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    Gif,
    Heif,
}

impl ImageKind {
    /// Determine the policy format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "tiff" => Some(ImageKind::Tiff),
            "bmp" => Some(ImageKind::Bmp),
            "gif" => Some(ImageKind::Gif),
            "heic" | "heif" => Some(ImageKind::Heif),
            _ => None,
        }
    }

    /// Whether this source needs forced conversion to JPEG.
    pub fn is_heif(self) -> bool {
        matches!(self, ImageKind::Heif)
    }
}

/// Opaque metadata blobs carried through from source to output unchanged.
///
/// Absence is not an error; a file without EXIF or an ICC profile simply
/// has nothing to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Raw EXIF payload, if present on the source
    pub exif: Option<Vec<u8>>,

    /// Raw ICC color profile, if present on the source
    pub icc: Option<Vec<u8>>,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded pixel data
    pub image: DynamicImage,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Metadata blobs found on the source
    pub meta: ImageMetadata,
}

/// Decode, resize and encode capability consumed by the pipeline.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decode an image from raw file bytes. `path` is for error context and
    /// format detection fallback only; no filesystem access happens here.
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError>;

    /// Resize to exactly `width` x `height` with a high-quality filter.
    /// Aspect-ratio math is the caller's job.
    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode to the given format, embedding the metadata blobs where the
    /// target container supports them.
    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageKind,
        meta: &ImageMetadata,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError>;
}

/// Color-mode normalization policy as a pure function.
///
/// Alpha-capable modes are kept as-is (no flattening), RGB8 is kept as-is,
/// and everything else (grayscale, 16-bit, float) converts to RGB8. No
/// alpha channel is ever spuriously added.
pub fn normalize_color(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        return image;
    }
    match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
