//! # In-place Image Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della configurazione (file JSON opzionale + flag CLI)
//! - Avvio dell'optimizer, cronometrato con `utils::timed`
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, limiti, qualità, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la directory esista
//! 4. Crea un oggetto Config, i flag sovrascrivono il file `--config`
//!    (salvabile con `--save-config` per le esecuzioni successive)
//! 5. Istanzia MediaOptimizer e processa la cartella
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-optimizer ./uploads --max-dim 1800 --max-size-kb 800 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use inplace_image_optimizer::utils::timed;
use inplace_image_optimizer::{Config, MediaOptimizer};

#[derive(Parser)]
#[command(name = "image-optimizer")]
#[command(about = "Shrink oversized JPEG/PNG/GIF images in place and write a CSV report")]
struct Args {
    /// Directory containing images to optimize (scanned recursively)
    media_directory: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum width or height in pixels
    #[arg(short = 'd', long)]
    max_dim: Option<u32>,

    /// Size budget per file in KB
    #[arg(short = 's', long)]
    max_size_kb: Option<f64>,

    /// Starting JPEG quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Directory for the CSV report (default: current directory)
    #[arg(short, long)]
    report_dir: Option<PathBuf>,

    /// Fill the OptimizedDim report column
    #[arg(long)]
    record_optimized_dim: bool,

    /// Dry run - don't actually overwrite files
    #[arg(long)]
    dry_run: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Write the effective configuration (file + flags) as JSON to this path
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<(PathBuf, Config)> {
        let mut config = match self.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(max_dim) = self.max_dim {
            config.max_dim_px = max_dim;
        }
        if let Some(max_size_kb) = self.max_size_kb {
            config.max_size_kb = max_size_kb;
        }
        if let Some(quality) = self.quality {
            config.jpeg_quality = quality;
        }
        if self.report_dir.is_some() {
            config.report_dir = self.report_dir;
        }
        config.record_optimized_dimensions |= self.record_optimized_dim;
        config.dry_run |= self.dry_run;
        config.show_progress_bar |= self.progress;

        Ok((self.media_directory, config))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.media_directory.exists() {
        return Err(anyhow::anyhow!(
            "Media directory does not exist: {}",
            args.media_directory.display()
        ));
    }

    let save_config = args.save_config.clone();
    let (media_directory, config) = args.into_config()?;
    if let Some(path) = save_config {
        config.save_to_file(&path)?;
        tracing::info!("Configuration saved to {}", path.display());
    }
    let optimizer = MediaOptimizer::new(&media_directory, config)?;

    let label = format!("process_folder({})", media_directory.display());
    let (result, _) = timed(&label, || optimizer.run());
    result?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_saved_config_keeps_flag_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let saved = temp_dir.path().join("optimizer.json");
        let args = Args::try_parse_from([
            "image-optimizer",
            "media",
            "--max-dim",
            "1200",
            "--dry-run",
            "--save-config",
            saved.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(args.save_config.as_deref(), Some(saved.as_path()));

        let (_, config) = args.into_config().unwrap();
        config.save_to_file(&saved).unwrap();

        let reloaded = Config::from_file(&saved).unwrap();
        assert_eq!(reloaded.max_dim_px, 1200);
        assert!(reloaded.dry_run);
        assert_eq!(reloaded.jpeg_quality, Config::default().jpeg_quality);
    }
}
