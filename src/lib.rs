//! # Batch Media Processor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Classificazione per estensione, listing e spostamento file
//! - `tool_resolver`: Ricerca dei tool esterni (`rembg`, ImageMagick)
//! - `utils`: Invocazione dei processi esterni
//! - `background`: Background removal
//! - `transform`: Trim, resize e canvas quadrato trasparente
//! - `processor`: Orchestratore del run (root pass + subfolder pass)
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per l'uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use batch_media_processor::{process, Config};
//!
//! let stats = process(Config::for_base_dir("/media/inbox")).await?;
//! println!("{}", stats.format_summary());
//! ```

pub mod background;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod processor;
pub mod progress;
pub mod tool_resolver;
pub mod transform;
pub mod utils;

#[cfg(test)]
mod mocks;

pub use config::{Config, TransformerKind};
pub use error::ProcessError;
pub use processor::{process, BatchProcessor};
pub use progress::RunStats;
