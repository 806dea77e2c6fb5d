//! ImageMagick backend.
//!
//! Tool priority: the configured command (default `magick`, ImageMagick 7),
//! then `convert` (ImageMagick 6) when the default is not installed. Both
//! accept the same argument list.

use super::{ImageTransformer, TransformOptions};
use crate::error::ProcessError;
use crate::tool_resolver::ToolPathResolver;
use crate::utils::{run_tool, square_geometry, to_arg_vec};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

const LEGACY_COMMAND: &str = "convert";

/// Trim / resize / extent through ImageMagick
pub struct MagickTransformer {
    command: String,
    resolver: ToolPathResolver,
}

impl MagickTransformer {
    pub fn with_resolver(command: impl Into<String>, resolver: ToolPathResolver) -> Self {
        Self {
            command: command.into(),
            resolver,
        }
    }

    /// Builds `<in> [-trim +repage] -resize NxN> -background none -gravity center -extent NxN <out>`
    pub fn build_args(input: &Path, output: &Path, options: &TransformOptions) -> Vec<OsString> {
        let geometry = square_geometry(options.canvas_size);
        // '>' only shrinks, never enlarges
        let shrink_only = format!("{}>", geometry);
        let mut args = to_arg_vec([input]);

        if options.trim {
            args.extend(to_arg_vec(["-trim", "+repage"]));
        }

        args.extend(to_arg_vec([
            "-resize",
            shrink_only.as_str(),
            "-background",
            "none",
            "-gravity",
            "center",
            "-extent",
            geometry.as_str(),
        ]));

        args.push(output.as_os_str().to_os_string());
        args
    }

    /// Resolved (tool name, tool path), with the ImageMagick 6 fallback
    fn resolve(&self) -> Result<(String, PathBuf), ProcessError> {
        if let Some(path) = self.resolver.resolve_tool(&self.command) {
            return Ok((self.command.clone(), path));
        }

        if self.command == "magick" {
            if let Some(path) = self.resolver.resolve_tool(LEGACY_COMMAND) {
                debug!("magick not found, falling back to {}", LEGACY_COMMAND);
                return Ok((LEGACY_COMMAND.to_string(), path));
            }
        }

        Err(ProcessError::MissingDependency(format!(
            "{} (install with: {})",
            self.command,
            ToolPathResolver::install_instructions(&self.command)
        )))
    }

    async fn run(&self, input: &Path, output: &Path, options: &TransformOptions) -> Result<()> {
        let (tool_name, tool_path) = self.resolve()?;
        let args = Self::build_args(input, output, options);
        run_tool(&tool_name, &tool_path, &args).await?;
        Ok(())
    }
}

impl ImageTransformer for MagickTransformer {
    fn name(&self) -> &str {
        &self.command
    }

    fn transform<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
        options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<()>> {
        self.run(input, output, options).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    #[cfg(unix)]
    use crate::mocks::{write_png, write_script};

    #[test]
    fn test_args_with_trim() {
        let args = MagickTransformer::build_args(
            Path::new("/tmp/a_nobg.png"),
            Path::new("/out/a.png"),
            &TransformOptions::default(),
        );
        assert_eq!(
            args,
            vec![
                "/tmp/a_nobg.png",
                "-trim",
                "+repage",
                "-resize",
                "512x512>",
                "-background",
                "none",
                "-gravity",
                "center",
                "-extent",
                "512x512",
                "/out/a.png",
            ]
        );
    }

    #[test]
    fn test_args_without_trim() {
        let options = TransformOptions {
            canvas_size: 256,
            trim: false,
        };
        let args = MagickTransformer::build_args(Path::new("in.png"), Path::new("out.webp"), &options);
        assert!(!args.contains(&OsString::from("-trim")));
        assert_eq!(args[1], "-resize");
        assert_eq!(args[2], "256x256>");
        assert_eq!(args.last().unwrap(), "out.webp");
    }

    #[test]
    fn test_falls_back_to_convert() {
        let temp_dir = TempDir::new().unwrap();
        let name = if cfg!(windows) { "convert.exe" } else { "convert" };
        std::fs::write(temp_dir.path().join(name), b"").unwrap();

        let resolver = ToolPathResolver::with_search_dirs(vec![temp_dir.path().to_path_buf()]);
        let transformer = MagickTransformer::with_resolver("magick", resolver);
        let (tool, path) = transformer.resolve().unwrap();
        assert_eq!(tool, "convert");
        assert_eq!(path, temp_dir.path().join(name));
    }

    #[test]
    fn test_missing_everything() {
        let transformer = MagickTransformer::with_resolver("magick", ToolPathResolver::with_search_dirs(Vec::new()));
        assert!(matches!(transformer.resolve(), Err(ProcessError::MissingDependency(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_tool_and_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("bin");
        // copies the first argument to the last one
        write_script(&bin, "magick", "for arg; do out=\"$arg\"; done\ncp \"$1\" \"$out\"");
        let input = temp_dir.path().join("a_nobg.png");
        let output = temp_dir.path().join("a.png");
        write_png(&input, 12, 12);

        let transformer = MagickTransformer::with_resolver("magick", ToolPathResolver::with_search_dirs(vec![bin]));
        transformer
            .transform(&input, &output, &TransformOptions::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_tool_failed() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("bin");
        write_script(&bin, "magick", "echo 'no decode delegate' >&2\nexit 1");
        let input = temp_dir.path().join("a_nobg.png");
        write_png(&input, 12, 12);

        let transformer = MagickTransformer::with_resolver("magick", ToolPathResolver::with_search_dirs(vec![bin]));
        let err = transformer
            .transform(&input, &temp_dir.path().join("a.png"), &TransformOptions::default())
            .await
            .unwrap_err();

        match err.downcast_ref::<ProcessError>() {
            Some(ProcessError::ToolFailed { tool, code, stderr }) => {
                assert_eq!(tool, "magick");
                assert_eq!(*code, Some(1));
                assert_eq!(stderr, "no decode delegate");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
