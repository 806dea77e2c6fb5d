//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom del processore batch.
//!
//! ## Responsabilità:
//! - Definisce `ProcessError` enum per categorizzare gli errori fatali
//! - Distingue i fallimenti dei tool esterni (exit code + stderr) dagli errori di I/O
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (permessi, disco pieno, path troppo lunghi)
//! - `Image`: Errori di decodifica/codifica nel backend nativo
//! - `ToolFailed`: Tool esterno (rembg, magick) terminato con exit code non zero
//! - `MissingDependency`: Tool esterno non trovato nel PATH
//! - `UnsupportedFormat`: Formato di output non gestito dal backend nativo
//! - `InvalidPath`: Base directory inesistente o path senza nome file
//! - `Validation`: Configurazione non valida
//!
//! Nessuno di questi errori viene recuperato: il run si interrompe al primo errore.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !status.success() {
//!     return Err(ProcessError::tool_failed("rembg", &output).into());
//! }
//! ```

use std::process::Output;

/// Custom error types for batch processing
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{tool} exited with status {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ProcessError {
    /// Build a `ToolFailed` from a finished process output
    pub fn tool_failed(tool: &str, output: &Output) -> Self {
        Self::ToolFailed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_message() {
        let err = ProcessError::ToolFailed {
            tool: "rembg".to_string(),
            code: Some(2),
            stderr: "cannot identify image".to_string(),
        };
        assert_eq!(err.to_string(), "rembg exited with status Some(2): cannot identify image");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ProcessError = io.into();
        assert!(matches!(err, ProcessError::Io(_)));
    }
}
