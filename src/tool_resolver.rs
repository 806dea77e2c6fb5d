//! # Tool Path Resolver
//!
//! Locates the external binaries the pipeline shells out to. A configured
//! command is either an explicit path (used as-is when it exists) or a bare
//! name looked up on `PATH`.

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolves tool names to executable paths
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    search_dirs: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Resolver over the directories of the current `PATH`
    pub fn new() -> Self {
        let search_dirs = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_dirs }
    }

    /// Resolver over an explicit list of directories
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, command: &str) -> Option<PathBuf> {
        let as_path = Path::new(command);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            debug!("Checking explicit tool path: {}", as_path.display());
            return as_path.is_file().then(|| as_path.to_path_buf());
        }

        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", command, extension);

        let found = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file());

        match &found {
            Some(path) => debug!("Resolved tool: {} -> {}", command, path.display()),
            None => debug!("Tool not found on PATH: {}", command),
        }
        found
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, command: &str) -> bool {
        self.resolve_tool(command).is_some()
    }

    /// Installation hint for a missing tool
    pub fn install_instructions(command: &str) -> String {
        let name = Path::new(command)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| command.to_string());

        match name.as_str() {
            "rembg" => "pip install \"rembg[cli]\"".to_string(),
            "magick" | "convert" => {
                if cfg!(target_os = "linux") {
                    "sudo apt-get install imagemagick".to_string()
                } else if cfg!(target_os = "macos") {
                    "brew install imagemagick".to_string()
                } else {
                    "install ImageMagick from https://imagemagick.org".to_string()
                }
            }
            other => format!("install '{}' and make sure it is on PATH", other),
        }
    }

    /// Log a warning for every listed tool that cannot be resolved
    pub fn warn_missing(&self, commands: &[&str]) -> Vec<String> {
        let mut missing = Vec::new();
        for command in commands {
            if !self.is_tool_available(command) {
                warn!(
                    "Tool '{}' not found (install with: {})",
                    command,
                    Self::install_instructions(command)
                );
                missing.push(command.to_string());
            }
        }
        missing
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_tool(dir: &Path, name: &str) -> PathBuf {
        let file_name = if cfg!(windows) { format!("{}.exe", name) } else { name.to_string() };
        let path = dir.join(file_name);
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        path
    }

    #[test]
    fn test_resolves_from_search_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let expected = fake_tool(temp_dir.path(), "rembg");

        let resolver = ToolPathResolver::with_search_dirs(vec![temp_dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve_tool("rembg"), Some(expected));
        assert!(!resolver.is_tool_available("magick"));
    }

    #[test]
    fn test_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let tool = fake_tool(temp_dir.path(), "custom-magick");
        let resolver = ToolPathResolver::with_search_dirs(Vec::new());

        let command = tool.to_string_lossy().to_string();
        assert_eq!(resolver.resolve_tool(&command), Some(tool));

        let missing = temp_dir.path().join("nope").to_string_lossy().to_string();
        assert_eq!(resolver.resolve_tool(&missing), None);
    }

    #[test]
    fn test_warn_missing_reports_names() {
        let resolver = ToolPathResolver::with_search_dirs(Vec::new());
        let missing = resolver.warn_missing(&["rembg", "magick"]);
        assert_eq!(missing, vec!["rembg".to_string(), "magick".to_string()]);
    }

    #[test]
    fn test_install_instructions() {
        assert!(ToolPathResolver::install_instructions("rembg").contains("rembg"));
        assert!(ToolPathResolver::install_instructions("/usr/local/bin/magick").contains("magick"));
    }
}
