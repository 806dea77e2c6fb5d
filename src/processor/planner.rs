//! # Planner Module
//!
//! Trasforma il listing di una directory in una sequenza di `Action`.
//! Il planner non tocca il filesystem oltre al listing: la stessa
//! pianificazione alimenta sia il run reale sia il dry run.

use super::layout::OutputLayout;
use crate::file_manager::{FileManager, MediaKind};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What happens to a single source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Background removal + normalization into `destination`
    ProcessImage { source: PathBuf, destination: PathBuf },
    /// Verbatim relocation into `destination`
    MoveVideo { source: PathBuf, destination: PathBuf },
    /// Unclassified extension, left alone
    Skip { source: PathBuf },
}

impl Action {
    pub fn kind(&self) -> MediaKind {
        match self {
            Action::ProcessImage { .. } => MediaKind::Image,
            Action::MoveVideo { .. } => MediaKind::Video,
            Action::Skip { .. } => MediaKind::Other,
        }
    }

    /// True for actions that produce output
    pub fn is_work(&self) -> bool {
        !matches!(self, Action::Skip { .. })
    }
}

/// Plan for one source subfolder
#[derive(Debug, Clone)]
pub struct FolderPlan {
    pub source: PathBuf,
    pub name: OsString,
    pub output_dir: PathBuf,
    pub actions: Vec<Action>,
}

impl FolderPlan {
    pub fn work_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_work()).count()
    }
}

/// Builds actions for the root pass and for each subfolder
#[derive(Debug, Clone)]
pub struct Planner {
    layout: OutputLayout,
    skip_files: HashSet<OsString>,
}

impl Planner {
    pub fn new<I>(layout: OutputLayout, skip_files: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self {
            layout,
            skip_files: skip_files.into_iter().collect(),
        }
    }

    /// Actions for the direct files of `base_dir`, skip-listed names excluded
    pub fn plan_root(&self, base_dir: &Path) -> Result<Vec<Action>> {
        let files = FileManager::list_files(base_dir)
            .with_context(|| format!("Failed to list {}", base_dir.display()))?;

        let mut actions = Vec::with_capacity(files.len());
        for source in files {
            if source.file_name().is_some_and(|name| self.skip_files.contains(name)) {
                debug!("Excluded from root pass: {}", source.display());
                continue;
            }

            let action = match MediaKind::of(&source) {
                MediaKind::Image => Action::ProcessImage {
                    destination: self.layout.root_destination(&source)?,
                    source,
                },
                MediaKind::Video => Action::MoveVideo {
                    destination: self.layout.root_destination(&source)?,
                    source,
                },
                MediaKind::Other => Action::Skip { source },
            };
            actions.push(action);
        }

        Ok(actions)
    }

    /// Direct subdirectories of `base_dir` other than the output and scratch trees
    pub fn folders(&self, base_dir: &Path) -> Result<Vec<PathBuf>> {
        let dirs = FileManager::list_subdirs(base_dir)
            .with_context(|| format!("Failed to list {}", base_dir.display()))?;

        Ok(dirs
            .into_iter()
            .filter(|dir| {
                let reserved = self.layout.is_reserved(dir);
                if reserved {
                    debug!("Not a source folder: {}", dir.display());
                }
                !reserved
            })
            .collect())
    }

    /// Actions for the direct files of one subfolder
    pub fn plan_folder(&self, folder: &Path) -> Result<FolderPlan> {
        let name = folder
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid folder name: {}", folder.display()))?
            .to_os_string();

        let files = FileManager::list_files(folder)
            .with_context(|| format!("Failed to list {}", folder.display()))?;

        let mut actions = Vec::with_capacity(files.len());
        for source in files {
            let action = match MediaKind::of(&source) {
                MediaKind::Image => Action::ProcessImage {
                    destination: self.layout.folder_image_destination(&name, &source)?,
                    source,
                },
                MediaKind::Video => Action::MoveVideo {
                    destination: self.layout.folder_video_destination(&name, &source)?,
                    source,
                },
                MediaKind::Other => Action::Skip { source },
            };
            actions.push(action);
        }

        Ok(FolderPlan {
            source: folder.to_path_buf(),
            output_dir: self.layout.folder_dir(&name),
            name,
            actions,
        })
    }
}
