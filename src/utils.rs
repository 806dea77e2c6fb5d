//! # Utility Functions Module
//!
//! Helpers for building and running subprocess invocations.

use crate::error::ProcessError;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, error};

/// Run an external tool to completion. Non-zero exit becomes `ToolFailed`.
pub async fn run_tool(tool_name: &str, tool_path: &Path, args: &[OsString]) -> Result<(), ProcessError> {
    debug!("Command: {:?} {:?}", tool_path, args);

    let start_time = Instant::now();
    let output = Command::new(tool_path)
        .args(args)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::MissingDependency(format!(
                "{} ({})",
                tool_name,
                tool_path.display()
            )),
            _ => ProcessError::Io(e),
        })?;
    let elapsed = start_time.elapsed();

    if output.status.success() {
        debug!("{} completed in {:?}", tool_name, elapsed);
        Ok(())
    } else {
        let err = ProcessError::tool_failed(tool_name, &output);
        error!("{} failed after {:?}: {}", tool_name, elapsed, err);
        Err(err)
    }
}

/// Converts any iterable of string-like items into owned command arguments.
/// Paths go through as-is, so non UTF-8 file names stay intact.
///
/// ```rust,ignore
/// let args = to_arg_vec([input.as_os_str(), OsStr::new("-resize"), OsStr::new(&geometry)]);
/// ```
pub fn to_arg_vec<T, I>(items: I) -> Vec<OsString>
where
    T: AsRef<OsStr>,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.as_ref().to_os_string()).collect()
}

/// ImageMagick geometry for a square box
pub fn square_geometry(size: u32) -> String {
    format!("{}x{}", size, size)
}
