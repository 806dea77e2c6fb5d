//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione del processore batch.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` passata esplicitamente all'entry point
//! - Risolve output e scratch directory rispetto alla base directory
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `base_dir`: Directory da processare (default: ".")
//! - `output_dir`: Albero di output (default: `<base>/DONE`)
//! - `scratch_dir`: Directory temporanea (default: `<base>/_tmp`)
//! - `canvas_size`: Lato del canvas quadrato finale (default: 512)
//! - `trim`: Ritaglia i bordi uniformi prima del resize (default: true)
//! - `transformer`: Backend di trasformazione (`magick` o `native`, default: `magick`)
//! - `rembg_command` / `magick_command`: Nomi o path dei tool esterni
//! - `skip_files`: Nomi di file nella root da non toccare mai
//! - `dry_run`: Pianifica senza modificare nulla (default: false)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! ## Validazione:
//! - `canvas_size` tra 1 e 16384
//! - Comandi dei tool non vuoti
//! - Output e scratch directory distinte fra loro e dalla base directory
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     base_dir: PathBuf::from("/media/inbox"),
//!     trim: false,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ProcessError;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the output directory when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "DONE";
/// Name of the scratch directory when none is configured
pub const DEFAULT_SCRATCH_DIR: &str = "_tmp";
/// Output subdirectory receiving top-level files
pub const ROOT_OUTPUT_DIR: &str = "root";

const MAX_CANVAS_SIZE: u32 = 16384;

/// Which backend performs trim / resize / extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransformerKind {
    /// ImageMagick (`magick`, falling back to `convert`)
    Magick,
    /// In-process implementation on top of the `image` crate
    Native,
}

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory whose root files and immediate subfolders are processed
    pub base_dir: PathBuf,
    /// Output tree (None = `<base>/DONE`, relative = joined onto base)
    pub output_dir: Option<PathBuf>,
    /// Scratch directory for intermediates (None = `<base>/_tmp`)
    pub scratch_dir: Option<PathBuf>,
    /// Side of the square output canvas in pixels
    pub canvas_size: u32,
    /// Crop uniform borders before resizing
    pub trim: bool,
    /// Transform backend
    pub transformer: TransformerKind,
    /// Background removal command (name on PATH or explicit path)
    pub rembg_command: String,
    /// ImageMagick command (name on PATH or explicit path)
    pub magick_command: String,
    /// Root-level file names that are never touched
    pub skip_files: Vec<String>,
    /// Plan and log only
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            output_dir: None,
            scratch_dir: None,
            canvas_size: 512,
            trim: true,
            transformer: TransformerKind::Magick,
            rembg_command: "rembg".to_string(),
            magick_command: "magick".to_string(),
            skip_files: Vec::new(),
            dry_run: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Default configuration rooted at `base_dir`
    pub fn for_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Resolved output directory
    pub fn output_dir(&self) -> PathBuf {
        Self::resolve_against(&self.base_dir, self.output_dir.as_deref(), DEFAULT_OUTPUT_DIR)
    }

    /// Resolved scratch directory
    pub fn scratch_dir(&self) -> PathBuf {
        Self::resolve_against(&self.base_dir, self.scratch_dir.as_deref(), DEFAULT_SCRATCH_DIR)
    }

    fn resolve_against(base: &Path, configured: Option<&Path>, default_name: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => base.join(path),
            None => base.join(default_name),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 || self.canvas_size > MAX_CANVAS_SIZE {
            return Err(ProcessError::Validation(format!(
                "Canvas size must be between 1 and {}",
                MAX_CANVAS_SIZE
            ))
            .into());
        }

        if self.rembg_command.trim().is_empty() {
            return Err(ProcessError::Validation("Background removal command is empty".to_string()).into());
        }

        if self.magick_command.trim().is_empty() {
            return Err(ProcessError::Validation("ImageMagick command is empty".to_string()).into());
        }

        let output_dir = self.output_dir();
        let scratch_dir = self.scratch_dir();

        if output_dir == self.base_dir {
            return Err(ProcessError::Validation(format!(
                "Output directory cannot be the base directory: {}",
                output_dir.display()
            ))
            .into());
        }

        if scratch_dir == self.base_dir {
            return Err(ProcessError::Validation(format!(
                "Scratch directory cannot be the base directory: {}",
                scratch_dir.display()
            ))
            .into());
        }

        if scratch_dir == output_dir {
            return Err(ProcessError::Validation(format!(
                "Scratch and output directories must differ: {}",
                scratch_dir.display()
            ))
            .into());
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("batch-media").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
