//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout
//! - Fornisce un'interfaccia stabile per wrapper e script esterni
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run (directory, canvas, trim, dry run)
//! - `file_start`: Inizio elaborazione di un file
//! - `file_complete`: File elaborato o spostato
//! - `folder_removed`: Cartella sorgente eliminata
//! - `complete`: Fine del run con statistiche finali
//! - `error`: Errore fatale che interrompe il run

use crate::file_manager::MediaKind;
use crate::progress::RunStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        base_dir: PathBuf,
        output_dir: PathBuf,
        canvas_size: u32,
        trim: bool,
        dry_run: bool,
    },

    FileStart {
        path: PathBuf,
        kind: MediaKind,
    },

    FileComplete {
        source: PathBuf,
        destination: PathBuf,
        kind: MediaKind,
        size: u64,
    },

    FolderRemoved {
        path: PathBuf,
    },

    Complete {
        stats: RunStats,
        duration_seconds: f64,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Serialize to a single line
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    /// Messaggio di errore a partire da un errore anyhow con la sua catena
    pub fn error(err: &anyhow::Error) -> Self {
        let chain: Vec<String> = err.chain().skip(1).map(|cause| cause.to_string()).collect();
        Self::Error {
            message: err.to_string(),
            details: (!chain.is_empty()).then(|| chain.join(": ")),
        }
    }
}
