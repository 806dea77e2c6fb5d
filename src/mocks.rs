//! Test backends and fixture helpers.

use crate::background::BackgroundRemover;
use crate::error::ProcessError;
use crate::transform::{ImageTransformer, TransformOptions};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Inputs seen by a mock remover, in call order
pub type CallLog = Arc<Mutex<Vec<PathBuf>>>;

/// Stand-in for `rembg`: decodes the input and re-encodes it as PNG
#[derive(Default)]
pub struct CopyRemover {
    calls: CallLog,
}

impl CopyRemover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remover that records every input into `calls`
    pub fn with_log(calls: CallLog) -> Self {
        Self { calls }
    }

    fn copy(&self, input: &Path, output: &Path) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(input.to_path_buf());
        }
        let decoded = image::open(input).map_err(ProcessError::from)?;
        decoded.into_rgba8().save(output).map_err(ProcessError::from)?;
        Ok(())
    }
}

impl BackgroundRemover for CopyRemover {
    fn name(&self) -> &str {
        "copy"
    }

    fn remove_background<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
        async move { self.copy(input, output) }.boxed()
    }
}

/// Behaves like `CopyRemover` but exits non-zero for one file name
pub struct FailingRemover {
    fail_on: String,
    inner: CopyRemover,
}

impl FailingRemover {
    pub fn new(fail_on: &str) -> Self {
        Self {
            fail_on: fail_on.to_string(),
            inner: CopyRemover::new(),
        }
    }
}

impl BackgroundRemover for FailingRemover {
    fn name(&self) -> &str {
        "failing"
    }

    fn remove_background<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
        async move {
            if input.file_name().is_some_and(|name| name == self.fail_on.as_str()) {
                return Err::<(), anyhow::Error>(ProcessError::ToolFailed {
                    tool: "rembg".to_string(),
                    code: Some(1),
                    stderr: format!("cannot identify image file {}", input.display()),
                }
                .into());
            }
            self.inner.copy(input, output)
        }
        .boxed()
    }
}

/// Transformer that always exits non-zero without writing output
pub struct FailingTransformer;

impl ImageTransformer for FailingTransformer {
    fn name(&self) -> &str {
        "failing"
    }

    fn transform<'a>(
        &'a self,
        _input: &'a Path,
        _output: &'a Path,
        _options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            Err::<(), anyhow::Error>(
                ProcessError::ToolFailed {
                    tool: "magick".to_string(),
                    code: Some(1),
                    stderr: "no decode delegate".to_string(),
                }
                .into(),
            )
        }
        .boxed()
    }
}

/// Opaque PNG fixture
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbaImage::from_pixel(width, height, Rgba([20, 120, 220, 255]))
        .save(path)
        .unwrap();
}

/// Opaque JPEG fixture
pub fn write_jpg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, Rgb([200, 60, 30])).save(path).unwrap();
}

/// Executable `sh` script named `name` inside `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
