//! # Output Layout Module
//!
//! Centralizza tutta la logica di calcolo dei path di output e temporanei.
//!
//! ```text
//! DONE/
//! ├── root/
//! │   ├── a.png            (immagine dalla root)
//! │   └── intro.mp4        (video dalla root)
//! └── cats/
//!     ├── cats_b.jpg       (immagine: prefisso con il nome cartella)
//!     └── clip.mp4         (video: nome invariato)
//! _tmp/
//! └── b_nobg.png           (intermedio, vive solo durante la pipeline)
//! ```

use crate::config::{Config, ROOT_OUTPUT_DIR};
use crate::error::ProcessError;
use crate::file_manager::FileManager;
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

const INTERMEDIATE_SUFFIX: &str = "_nobg.png";

/// Path construction for the output tree and scratch area
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output_dir(), config.scratch_dir())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// `DONE/root`
    pub fn root_dir(&self) -> PathBuf {
        self.output_dir.join(ROOT_OUTPUT_DIR)
    }

    /// `DONE/<folder>`
    pub fn folder_dir(&self, folder_name: &OsStr) -> PathBuf {
        self.output_dir.join(folder_name)
    }

    /// `DONE/root/<file>`
    pub fn root_destination(&self, source: &Path) -> Result<PathBuf> {
        Ok(self.root_dir().join(file_name(source)?))
    }

    /// `DONE/<folder>/<folder>_<file>`
    pub fn folder_image_destination(&self, folder_name: &OsStr, source: &Path) -> Result<PathBuf> {
        let mut name = OsString::from(folder_name);
        name.push("_");
        name.push(file_name(source)?);
        Ok(self.folder_dir(folder_name).join(name))
    }

    /// `DONE/<folder>/<file>`
    pub fn folder_video_destination(&self, folder_name: &OsStr, source: &Path) -> Result<PathBuf> {
        Ok(self.folder_dir(folder_name).join(file_name(source)?))
    }

    /// `_tmp/<stem>_nobg.png`
    pub fn intermediate_path(&self, source: &Path) -> Result<PathBuf> {
        let mut name = source
            .file_stem()
            .ok_or_else(|| ProcessError::InvalidPath(format!("no file name: {}", source.display())))?
            .to_os_string();
        name.push(INTERMEDIATE_SUFFIX);
        Ok(self.scratch_dir.join(name))
    }

    /// True for the output dir, the scratch dir, and any directory containing them
    pub fn is_reserved(&self, dir: &Path) -> bool {
        self.output_dir.starts_with(dir)
            || self.scratch_dir.starts_with(dir)
            || FileManager::same_path(dir, &self.output_dir)
            || FileManager::same_path(dir, &self.scratch_dir)
    }

    /// Create output dir, `root/` and scratch dir
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root_dir(), self.scratch_dir.clone()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", dir.display(), e))?;
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> Result<&OsStr, ProcessError> {
    path.file_name()
        .ok_or_else(|| ProcessError::InvalidPath(format!("no file name: {}", path.display())))
}
