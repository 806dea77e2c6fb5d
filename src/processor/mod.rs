//! # Processor Module
//!
//! Separa le responsabilità del run in sottomoduli:
//! - `layout`: Calcolo centralizzato dei path di output e temporanei
//! - `planner`: Listing delle directory e classificazione in `Action`
//! - `image_pipeline`: Background removal + trasformazione di una singola immagine
//! - `batch_processor`: Orchestratore principale

pub mod batch_processor;
pub mod image_pipeline;
pub mod layout;
pub mod planner;

pub use batch_processor::BatchProcessor;
pub use image_pipeline::ImagePipeline;
pub use layout::OutputLayout;
pub use planner::{Action, FolderPlan, Planner};

use crate::config::Config;
use crate::progress::RunStats;
use anyhow::Result;

/// Process `config.base_dir` with the backends selected by `config`
pub async fn process(config: Config) -> Result<RunStats> {
    BatchProcessor::new(config).await?.run().await
}
