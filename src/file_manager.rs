//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la classificazione dei media.
//!
//! ## Responsabilità:
//! - Classificazione dei file per estensione (immagine, video, altro)
//! - Listing a un solo livello di profondità (file e sottocartelle dirette)
//! - Spostamento file con fallback copy+delete tra filesystem diversi
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati classificati:
//! - **Immagini**: PNG, JPG, JPEG, WebP
//! - **Video**: MP4, MOV, AVI, WebM
//! - Tutto il resto è `Other` e non viene mai toccato
//!
//! ## Link simbolici:
//! I link a file contano come file, i link rotti vengono ignorati e le
//! cartelle raggiunte tramite link non sono mai sottocartelle sorgente.
//!
//! ## Ordine di visita:
//! Le entry sono ordinate per nome, così due run sullo stesso albero
//! visitano i file nello stesso ordine su ogni piattaforma.
//!
//! ## Esempio:
//! ```rust,ignore
//! for file in FileManager::list_files(&base_dir)? {
//!     match MediaKind::of(&file) {
//!         MediaKind::Image => { /* pipeline */ }
//!         MediaKind::Video => FileManager::move_file(&file, &dest).await?,
//!         MediaKind::Other => {}
//!     }
//! }
//! ```

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Extension class of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify a path by its (case-insensitive) extension
    pub fn of(path: &Path) -> Self {
        let Some(ext) = path.extension() else {
            return Self::Other;
        };
        let ext_lower = ext.to_string_lossy().to_lowercase();
        match ext_lower.as_str() {
            "png" | "jpg" | "jpeg" | "webp" => Self::Image,
            "mp4" | "mov" | "avi" | "webm" => Self::Video,
            _ => Self::Other,
        }
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Direct file children of `dir`, sorted by name.
    /// Symlinks to files count as files; dangling links are left out.
    pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
        Self::list_children(dir, |entry| {
            let is_file = entry.path().is_file();
            if !is_file && entry.path_is_symlink() && !entry.path().exists() {
                debug!("Ignoring dangling link: {}", entry.path().display());
            }
            is_file
        })
    }

    /// Direct subdirectories of `dir`, sorted by name. Symlinked
    /// directories are not descended into.
    pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
        Self::list_children(dir, |entry| {
            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!("Ignoring symlinked folder: {}", entry.path().display());
                return false;
            }
            entry.file_type().is_dir()
        })
    }

    fn list_children<F>(dir: &Path, keep: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&walkdir::DirEntry) -> bool,
    {
        let mut children = Vec::new();

        // entries are not followed, so a broken link cannot fail the listing
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if keep(&entry) {
                children.push(entry.into_path());
            }
        }

        Ok(children)
    }

    /// Move a file, falling back to copy + delete when rename is not possible
    pub async fn move_file(source: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        match fs::rename(source, destination).await {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                debug!(
                    "Rename failed ({}), copying {} -> {}",
                    rename_err,
                    source.display(),
                    destination.display()
                );
                fs::copy(source, destination).await?;
                fs::remove_file(source).await?;
                Ok(())
            }
        }
    }

    /// True when both paths name the same filesystem entry
    pub fn same_path(a: &Path, b: &Path) -> bool {
        if a == b {
            return true;
        }
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
