//! # Image Transform Module
//!
//! Normalizza il PNG scontornato su un canvas quadrato trasparente.
//!
//! ## Passi richiesti:
//! 1. Trim opzionale dei bordi uniformi (crop al bounding box del soggetto)
//! 2. Resize che riduce soltanto, mantenendo l'aspect ratio, dentro `N x N`
//! 3. Composizione centrata su canvas trasparente esattamente `N x N`
//! 4. Scrittura sul path di destinazione, sovrascrivendo
//!
//! ## Backend:
//! - `magick`: ImageMagick esterno (default)
//! - `native`: implementazione in-process con il crate `image`

pub mod magick;
pub mod native;

pub use magick::MagickTransformer;
pub use native::NativeTransformer;

use crate::config::Config;
use anyhow::Result;
use futures::future::BoxFuture;
use std::path::Path;

/// Parameters of the trim / fit / extent step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Side of the output canvas
    pub canvas_size: u32,
    /// Crop uniform borders before fitting
    pub trim: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            canvas_size: 512,
            trim: true,
        }
    }
}

impl From<&Config> for TransformOptions {
    fn from(config: &Config) -> Self {
        Self {
            canvas_size: config.canvas_size,
            trim: config.trim,
        }
    }
}

/// Turns an intermediate PNG into the final composed image
pub trait ImageTransformer: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Transform `input` into `output` according to `options`
    fn transform<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
        options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<()>>;
}
