//! # Batch Media Processor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento del file di configurazione e override da CLI
//! - Avvio del processore e traduzione del risultato in exit code
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, canvas, backend, tool, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` rispettato)
//! 3. Carica `--config` o il file di default, poi applica gli override
//! 4. Esegue `process` ed esce con 0 in caso di successo, 1 altrimenti
//!
//! ## Esempio di utilizzo:
//! ```bash
//! batch-media /path/to/inbox --transformer native --skip logo.png --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use batch_media_processor::json_output::JsonMessage;
use batch_media_processor::{process, Config, TransformerKind};

#[derive(Parser)]
#[command(name = "batch-media")]
#[command(about = "Remove backgrounds, normalize images to a square canvas and collect videos into DONE/")]
struct Args {
    /// Directory to process (default: current directory)
    base_directory: Option<PathBuf>,

    /// Output directory (default: <base>/DONE)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scratch directory for intermediates (default: <base>/_tmp)
    #[arg(long)]
    scratch: Option<PathBuf>,

    /// Side of the square output canvas in pixels
    #[arg(long)]
    canvas_size: Option<u32>,

    /// Keep uniform borders instead of trimming them
    #[arg(long)]
    no_trim: bool,

    /// Backend used for trim / resize / extent
    #[arg(long, value_enum)]
    transformer: Option<TransformerKind>,

    /// Background removal command or path
    #[arg(long)]
    rembg: Option<String>,

    /// ImageMagick command or path
    #[arg(long)]
    magick: Option<String>,

    /// Root-level file name to leave untouched (repeatable)
    #[arg(long, value_name = "FILE")]
    skip: Vec<String>,

    /// Dry run - plan and log without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Output progress as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Configuration file (default: <config dir>/batch-media/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(base_dir) = self.base_directory {
            config.base_dir = base_dir;
        }
        if self.output.is_some() {
            config.output_dir = self.output;
        }
        if self.scratch.is_some() {
            config.scratch_dir = self.scratch;
        }
        if let Some(canvas_size) = self.canvas_size {
            config.canvas_size = canvas_size;
        }
        if self.no_trim {
            config.trim = false;
        }
        if let Some(transformer) = self.transformer {
            config.transformer = transformer;
        }
        if let Some(rembg) = self.rembg {
            config.rembg_command = rembg;
        }
        if let Some(magick) = self.magick {
            config.magick_command = magick;
        }
        config.skip_files.extend(self.skip);
        config.dry_run |= self.dry_run;
        config.json_output |= self.json;
        config
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path.cloned().or_else(Config::default_path) {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Config::from_file(&path).await
        }
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli_json = args.json;
    let loaded = load_config(args.config.as_ref()).await;
    let config = match loaded {
        Ok(config) => args.apply(config),
        Err(e) => return fail(&e, cli_json),
    };

    let json = config.json_output;
    match process(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e, json),
    }
}

fn fail(err: &anyhow::Error, json: bool) -> ExitCode {
    if json {
        JsonMessage::error(err).emit();
    }
    error!("{:#}", err);
    ExitCode::FAILURE
}
