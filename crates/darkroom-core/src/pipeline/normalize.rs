//! The transform policy: bound check, resize, format normalization, output.

use std::path::Path;
use std::sync::Arc;

use crate::codec::{normalize_color, ImageCodec, ImageKind};
use crate::config::NormalizeConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Normalization;

/// Compute the largest size fitting inside `max_width` x `max_height` while
/// preserving aspect ratio.
///
/// The tighter of the two scale-down factors is applied to both dimensions;
/// rounding never pushes a dimension past its bound and never below 1.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;
    let scale = width_ratio.min(height_ratio);

    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (new_width, new_height)
}

/// Applies the transform policy to a single stable file.
///
/// Owned by the worker; the blocking decode/resize/encode body runs on the
/// blocking thread pool so the async worker task stays responsive.
pub struct Normalizer<C: ImageCodec> {
    codec: Arc<C>,
    config: NormalizeConfig,
}

impl<C: ImageCodec> Normalizer<C> {
    /// Create a normalizer around the given codec.
    pub fn new(codec: Arc<C>, config: NormalizeConfig) -> Self {
        Self { codec, config }
    }

    /// Normalize one file in place.
    pub async fn normalize(&self, path: &Path) -> PipelineResult<Normalization> {
        let codec = Arc::clone(&self.codec);
        let config = self.config.clone();
        let task_path = path.to_path_buf();
        let join_path = path.to_path_buf();

        tokio::task::spawn_blocking(move || normalize_sync(codec.as_ref(), &config, &task_path))
            .await
            .map_err(|e| PipelineError::Decode {
                path: join_path,
                message: format!("Task join error: {}", e),
            })?
    }
}

fn normalize_sync<C: ImageCodec>(
    codec: &C,
    config: &NormalizeConfig,
    path: &Path,
) -> PipelineResult<Normalization> {
    let kind = ImageKind::from_path(path).ok_or_else(|| PipelineError::UnsupportedFormat {
        path: path.to_path_buf(),
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    })?;

    let bytes = std::fs::read(path).map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let decoded = codec.decode(&bytes, path)?;
    let (width, height) = (decoded.width, decoded.height);

    let within_bounds = width <= config.max_width && height <= config.max_height;
    if within_bounds && !kind.is_heif() {
        // Nothing to do, nothing written; reprocessing is a no-op
        return Ok(Normalization::Skipped { width, height });
    }

    let mut image = normalize_color(decoded.image);
    let resized = !within_bounds;
    if resized {
        let (new_width, new_height) =
            fit_within(width, height, config.max_width, config.max_height);
        tracing::debug!(
            "Resizing {} from {}x{} to {}x{}",
            path.display(),
            width,
            height,
            new_width,
            new_height
        );
        image = codec.resize(image, new_width, new_height);
    }

    if kind.is_heif() {
        // Forced normalization: always rewrite as a sibling .jpg, then
        // best-effort removal of the original
        let output = path.with_extension("jpg");
        let jpeg = codec.encode(&image, ImageKind::Jpeg, &decoded.meta, path)?;
        std::fs::write(&output, jpeg).map_err(|e| PipelineError::Encode {
            path: output.clone(),
            message: e.to_string(),
        })?;

        if let Err(e) = std::fs::remove_file(path) {
            let delete = PipelineError::Delete {
                path: path.to_path_buf(),
                message: e.to_string(),
            };
            tracing::warn!("{}", delete);
        }
        return Ok(Normalization::Converted { output, resized });
    }

    let out_bytes = codec.encode(&image, kind, &decoded.meta, path)?;
    std::fs::write(path, out_bytes).map_err(|e| PipelineError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Normalization::Resized {
        from: (width, height),
        to: (image.width(), image.height()),
    })
}
