//! # Background Removal Module
//!
//! Questo modulo isola il soggetto dallo sfondo e produce un PNG trasparente.
//!
//! ## Responsabilità:
//! - Definisce il trait `BackgroundRemover` (seam verso il tool esterno)
//! - Implementa `RembgRemover`, che invoca `rembg i <input> <output>`
//!
//! ## Contratto del tool:
//! - Legge un'immagine raster qualsiasi
//! - Scrive un PNG con lo sfondo reso trasparente
//! - Exit code non zero = fallimento fatale del run
//!
//! ## Esempio:
//! ```rust,ignore
//! let remover = RembgRemover::with_resolver("rembg", ToolPathResolver::new());
//! remover.remove_background(&source, &scratch.join("photo_nobg.png")).await?;
//! ```

use crate::error::ProcessError;
use crate::tool_resolver::ToolPathResolver;
use crate::utils::{run_tool, to_arg_vec};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

/// Produces a transparent-background PNG from an arbitrary raster image
pub trait BackgroundRemover: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Write the cut-out of `input` as PNG to `output`
    fn remove_background<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// Background removal through the `rembg` command line
pub struct RembgRemover {
    command: String,
    resolver: ToolPathResolver,
}

impl RembgRemover {
    pub fn with_resolver(command: impl Into<String>, resolver: ToolPathResolver) -> Self {
        Self {
            command: command.into(),
            resolver,
        }
    }

    /// Arguments for `rembg`: `i <input> <output>`
    pub fn build_args(input: &Path, output: &Path) -> Vec<OsString> {
        to_arg_vec([OsStr::new("i"), input.as_os_str(), output.as_os_str()])
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let tool_path = self.resolver.resolve_tool(&self.command).ok_or_else(|| {
            ProcessError::MissingDependency(format!(
                "{} (install with: {})",
                self.command,
                ToolPathResolver::install_instructions(&self.command)
            ))
        })?;

        let args = Self::build_args(input, output);
        debug!("Removing background with {}: {}", tool_path.display(), input.display());
        run_tool(&self.command, &tool_path, &args).await?;
        Ok(())
    }
}

impl BackgroundRemover for RembgRemover {
    fn name(&self) -> &str {
        &self.command
    }

    fn remove_background<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
        self.run(input, output).boxed()
    }
}
