//! # Image Pipeline
//!
//! Background removal → trim/resize/extent → cleanup dell'intermedio.
//! L'intermedio vive in `_tmp/<stem>_nobg.png` e viene eliminato appena
//! il passo di trasformazione è terminato, con successo o meno.

use super::layout::OutputLayout;
use crate::background::BackgroundRemover;
use crate::transform::{ImageTransformer, TransformOptions};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs one image through both backends
pub struct ImagePipeline {
    remover: Box<dyn BackgroundRemover>,
    transformer: Box<dyn ImageTransformer>,
    layout: OutputLayout,
    options: TransformOptions,
}

impl ImagePipeline {
    pub fn new(
        remover: Box<dyn BackgroundRemover>,
        transformer: Box<dyn ImageTransformer>,
        layout: OutputLayout,
        options: TransformOptions,
    ) -> Self {
        Self {
            remover,
            transformer,
            layout,
            options,
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Remove the background of `source` and write the normalized image to `destination`
    pub async fn run(&self, source: &Path, destination: &Path) -> Result<()> {
        let display_name = source.file_name().unwrap_or_default().to_string_lossy();
        let intermediate = self.layout.intermediate_path(source)?;

        info!("Removing background: {}", display_name);
        self.remover
            .remove_background(source, &intermediate)
            .await
            .with_context(|| format!("Background removal failed for {}", source.display()))?;

        info!(
            "Resizing to {}x{}: {}",
            self.options.canvas_size, self.options.canvas_size, display_name
        );
        let transformed = self
            .transformer
            .transform(&intermediate, destination, &self.options)
            .await
            .with_context(|| format!("Transform with {} failed for {}", self.transformer.name(), source.display()));

        let cleanup = tokio::fs::remove_file(&intermediate).await;
        match (&transformed, cleanup) {
            (_, Ok(())) => debug!("Removed intermediate: {}", intermediate.display()),
            (Err(_), Err(e)) => warn!("Failed to remove intermediate {}: {}", intermediate.display(), e),
            (Ok(()), Err(e)) => {
                return Err(e).with_context(|| format!("Failed to remove intermediate {}", intermediate.display()));
            }
        }

        transformed
    }
}
