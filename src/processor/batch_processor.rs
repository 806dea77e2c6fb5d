//! # Batch Processor Main Orchestrator
//!
//! Orchestratore del run: root pass, subfolder pass, cleanup finale.
//!
//! ## Responsabilità:
//! - Risolve la base directory e costruisce layout, planner e pipeline
//! - Processa prima tutti i file della root, poi ogni sottocartella
//! - Elimina le sorgenti solo dopo che il loro output è stato scritto
//! - Riporta progresso via `indicatif`, `tracing` ed eventi JSON
//!
//! ## Flusso di esecuzione:
//! 1. Crea `DONE/`, `DONE/root/` e `_tmp/`
//! 2. Root pass: immagini → pipeline + delete, video → move, altro → ignorato
//! 3. Subfolder pass: stessa logica, poi delete ricorsivo della cartella
//! 4. Rimuove `_tmp/` e riporta le statistiche
//!
//! Ogni errore interrompe il run: nessun retry, nessun cleanup parziale.

use super::image_pipeline::ImagePipeline;
use super::layout::OutputLayout;
use super::planner::{Action, Planner};
use crate::background::{BackgroundRemover, RembgRemover};
use crate::config::{Config, TransformerKind};
use crate::error::ProcessError;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::progress::{ProgressManager, RunStats};
use crate::tool_resolver::ToolPathResolver;
use crate::transform::{ImageTransformer, MagickTransformer, NativeTransformer, TransformOptions};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const LEGACY_MAGICK: &str = "convert";

/// Sequential processor for one base directory
pub struct BatchProcessor {
    config: Config,
    layout: OutputLayout,
    planner: Planner,
    pipeline: ImagePipeline,
    required_tools: Vec<String>,
    resolver: ToolPathResolver,
    progress: ProgressManager,
}

impl BatchProcessor {
    /// Processor with the backends selected by `config`
    pub async fn new(config: Config) -> Result<Self> {
        let resolver = ToolPathResolver::new();
        let remover = Box::new(RembgRemover::with_resolver(&config.rembg_command, resolver.clone()));
        let mut required_tools = vec![config.rembg_command.clone()];

        let transformer: Box<dyn ImageTransformer> = match config.transformer {
            TransformerKind::Magick => {
                let magick = &config.magick_command;
                if magick == "magick"
                    && !resolver.is_tool_available(magick)
                    && resolver.is_tool_available(LEGACY_MAGICK)
                {
                    required_tools.push(LEGACY_MAGICK.to_string());
                } else {
                    required_tools.push(magick.clone());
                }
                Box::new(MagickTransformer::with_resolver(magick, resolver.clone()))
            }
            TransformerKind::Native => Box::new(NativeTransformer::new()),
        };

        let mut processor = Self::with_backends(config, remover, transformer).await?;
        processor.required_tools = required_tools;
        processor.resolver = resolver;
        Ok(processor)
    }

    /// Processor with caller-supplied backends and no preflight tool check
    pub async fn with_backends(
        mut config: Config,
        remover: Box<dyn BackgroundRemover>,
        transformer: Box<dyn ImageTransformer>,
    ) -> Result<Self> {
        config.base_dir = resolve_base_dir(&config.base_dir).await?;
        config.validate()?;

        let layout = OutputLayout::from_config(&config);
        let planner = Planner::new(layout.clone(), skip_list(&config));
        let pipeline = ImagePipeline::new(remover, transformer, layout.clone(), TransformOptions::from(&config));

        let progress = if config.json_output || config.dry_run {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(0)
        };

        Ok(Self {
            config,
            layout,
            planner,
            pipeline,
            required_tools: Vec::new(),
            resolver: ToolPathResolver::new(),
            progress,
        })
    }

    /// Run both passes and return the counters
    pub async fn run(&self) -> Result<RunStats> {
        let started = Instant::now();

        if self.config.json_output {
            JsonMessage::Start {
                base_dir: self.config.base_dir.clone(),
                output_dir: self.layout.output_dir().to_path_buf(),
                canvas_size: self.pipeline.options().canvas_size,
                trim: self.pipeline.options().trim,
                dry_run: self.config.dry_run,
            }
            .emit();
        }

        let result = if self.config.dry_run {
            self.plan_only()
        } else {
            self.process_all().await
        };

        match result {
            Ok(stats) => {
                self.progress.finish("All done");
                info!("{}", stats.format_summary());
                if self.config.json_output {
                    JsonMessage::Complete {
                        stats: stats.clone(),
                        duration_seconds: started.elapsed().as_secs_f64(),
                    }
                    .emit();
                }
                Ok(stats)
            }
            Err(e) => {
                self.progress.abandon();
                Err(e)
            }
        }
    }

    async fn process_all(&self) -> Result<RunStats> {
        let base_dir = &self.config.base_dir;
        let mut stats = RunStats::new();

        self.layout.ensure_dirs().await?;
        self.check_tools();

        info!("Processing root files in {}", base_dir.display());
        let root_actions = self.planner.plan_root(base_dir)?;
        self.progress
            .add_work(root_actions.iter().filter(|a| a.is_work()).count() as u64);
        for action in &root_actions {
            self.execute(action, true, &mut stats).await?;
        }

        for folder in self.planner.folders(base_dir)? {
            let plan = self.planner.plan_folder(&folder)?;
            self.progress.add_work(plan.work_count() as u64);

            info!("Processing folder: {}", plan.name.to_string_lossy());
            tokio::fs::create_dir_all(&plan.output_dir)
                .await
                .with_context(|| format!("Failed to create directory {}", plan.output_dir.display()))?;

            for action in &plan.actions {
                self.execute(action, false, &mut stats).await?;
            }

            tokio::fs::remove_dir_all(&plan.source)
                .await
                .with_context(|| format!("Failed to delete folder {}", plan.source.display()))?;
            info!("Deleted original folder: {}", plan.name.to_string_lossy());
            stats.add_folder_removed();
            if self.config.json_output {
                JsonMessage::FolderRemoved { path: plan.source.clone() }.emit();
            }
        }

        let scratch = self.layout.scratch_dir();
        if scratch.exists() {
            tokio::fs::remove_dir_all(scratch)
                .await
                .with_context(|| format!("Failed to delete scratch directory {}", scratch.display()))?;
        }
        info!("All done");

        Ok(stats)
    }

    /// Handle one planned action; `delete_source` is set for root images
    async fn execute(&self, action: &Action, delete_source: bool, stats: &mut RunStats) -> Result<()> {
        let (source, destination) = match action {
            Action::Skip { source } => {
                debug!("Skipping unsupported file: {}", source.display());
                stats.add_skipped();
                return Ok(());
            }
            Action::ProcessImage { source, destination } | Action::MoveVideo { source, destination } => {
                (source, destination)
            }
        };

        if self.config.json_output {
            JsonMessage::FileStart {
                path: source.clone(),
                kind: action.kind(),
            }
            .emit();
        }

        if let Action::ProcessImage { .. } = action {
            self.pipeline
                .run(source, destination)
                .await
                .with_context(|| format!("Failed to process {}", source.display()))?;
            if delete_source {
                tokio::fs::remove_file(source)
                    .await
                    .with_context(|| format!("Failed to delete original {}", source.display()))?;
            }
        } else {
            info!("Moving video: {}", display_name(source));
            FileManager::move_file(source, destination).await?;
        }

        let size = tokio::fs::metadata(destination)
            .await
            .map(|m| m.len())
            .map_err(ProcessError::from)
            .with_context(|| format!("Output missing after processing: {}", destination.display()))?;

        match action {
            Action::ProcessImage { .. } => stats.add_image(size),
            _ => stats.add_video(size),
        }
        self.progress.update(&display_name(source));

        if self.config.json_output {
            JsonMessage::FileComplete {
                source: source.clone(),
                destination: destination.clone(),
                kind: action.kind(),
                size,
            }
            .emit();
        }

        Ok(())
    }

    /// Dry run: plan both passes, log every step, touch nothing
    fn plan_only(&self) -> Result<RunStats> {
        let base_dir = &self.config.base_dir;
        let mut stats = RunStats::new();

        info!("Dry run: no files will be created, moved or deleted");
        for action in self.planner.plan_root(base_dir)? {
            log_planned(&action, &mut stats);
        }

        for folder in self.planner.folders(base_dir)? {
            let plan = self.planner.plan_folder(&folder)?;
            info!("[dry run] Would process folder: {}", plan.name.to_string_lossy());
            for action in &plan.actions {
                log_planned(action, &mut stats);
            }
            info!("[dry run] Would delete folder: {}", plan.source.display());
            stats.add_folder_removed();
        }

        info!("[dry run] Would delete scratch directory: {}", self.layout.scratch_dir().display());
        Ok(stats)
    }

    fn check_tools(&self) {
        let tools: Vec<&str> = self.required_tools.iter().map(String::as_str).collect();
        let missing = self.resolver.warn_missing(&tools);
        if !missing.is_empty() {
            warn!("Continuing without: {}", missing.join(", "));
        }
    }
}

fn log_planned(action: &Action, stats: &mut RunStats) {
    match action {
        Action::ProcessImage { source, destination } => {
            info!("[dry run] Would process {} -> {}", source.display(), destination.display());
            stats.add_image(0);
        }
        Action::MoveVideo { source, destination } => {
            info!("[dry run] Would move {} -> {}", source.display(), destination.display());
            stats.add_video(0);
        }
        Action::Skip { source } => {
            debug!("[dry run] Would skip {}", source.display());
            stats.add_skipped();
        }
    }
}

async fn resolve_base_dir(base_dir: &Path) -> Result<std::path::PathBuf> {
    let resolved = tokio::fs::canonicalize(base_dir)
        .await
        .map_err(|e| ProcessError::InvalidPath(format!("{}: {}", base_dir.display(), e)))?;

    if !resolved.is_dir() {
        return Err(ProcessError::InvalidPath(format!("not a directory: {}", resolved.display())).into());
    }
    Ok(resolved)
}

/// Configured skip list plus the running executable when it sits in the base dir
fn skip_list(config: &Config) -> Vec<OsString> {
    let mut skip: Vec<OsString> = config.skip_files.iter().map(OsString::from).collect();

    if let Ok(exe) = std::env::current_exe() {
        let in_base = exe
            .parent()
            .is_some_and(|parent| FileManager::same_path(parent, &config.base_dir));
        if let (true, Some(name)) = (in_base, exe.file_name()) {
            skip.push(name.to_os_string());
        }
    }

    skip
}

fn display_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}
