//! # Media Optimizer Module
//!
//! Orchestratore principale dell'esecuzione su una cartella.
//!
//! ## Flusso di esecuzione:
//! 1. **Inizializzazione**: Valida la configurazione
//! 2. **File discovery**: Conta tutte le entry e raccoglie le immagini
//! 3. **Processing sequenziale**: Un file alla volta, nell'ordine di `walkdir`
//! 4. **Statistics**: Raccoglie i risultati per il riepilogo finale
//! 5. **Report**: Scrive il CSV solo se tutti i file sono andati a buon fine
//!
//! ## Error handling:
//! Il primo errore interrompe il batch. I file già ottimizzati restano
//! modificati (nessun rollback) e il report non viene scritto.
//!
//! ## Esempio:
//! ```rust,ignore
//! let optimizer = MediaOptimizer::new(&path, config)?;
//! let summary = optimizer.run()?;
//! ```

use crate::{
    config::Config,
    file_manager::FileManager,
    optimizer::{progress_tracker::ProgressTracker, task_optimizer::TaskOptimizer},
    progress::OptimizationStats,
    report::{self, LogEntry},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    pub entries: Vec<LogEntry>,
    pub stats: OptimizationStats,
    pub report_path: PathBuf,
    pub total_entries: usize,
}

/// Main image optimizer orchestrator
pub struct MediaOptimizer {
    config: Config,
    media_dir: PathBuf,
}

impl MediaOptimizer {
    /// Create a new optimizer for `media_dir`
    pub fn new(media_dir: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        if !media_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Media directory does not exist: {}",
                media_dir.display()
            ));
        }

        Ok(Self {
            config,
            media_dir: media_dir.to_path_buf(),
        })
    }

    /// Run the optimization process
    pub fn run(&self) -> Result<RunSummary> {
        info!("Starting image optimization in: {}", self.media_dir.display());
        self.log_configuration();

        let discovery = FileManager::find_image_files(&self.media_dir)?;
        info!(
            "Found {} images among {} entries",
            discovery.images.len(),
            discovery.total_entries
        );

        let mut tracker = ProgressTracker::new(
            discovery.total_entries,
            discovery.images.len(),
            self.config.show_progress_bar,
        );
        let task_optimizer = TaskOptimizer::new(self.config.clone());
        let mut stats = OptimizationStats::new();
        let mut entries = Vec::with_capacity(discovery.images.len());

        for path in &discovery.images {
            let (task, result) = task_optimizer
                .process_single_file(path, &mut tracker)
                .inspect_err(|e| {
                    error!(
                        "Batch aborted at {} ({}/{} entries), no report written: {}",
                        e.path().unwrap_or(path).display(),
                        tracker.processed_files(),
                        tracker.total_files(),
                        e
                    );
                })?;

            match result.optimized_size_kb {
                Some(optimized_kb) => stats.add_optimized(task.original_size_kb, optimized_kb),
                None => stats.add_skipped(task.original_size_kb),
            }
            entries.push(task_optimizer.log_entry(&task, &result));
        }

        tracker.finish(&stats.format_summary());

        let report_dir = self
            .config
            .report_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let report_path = report::write_report(&report_dir, &entries)?;

        self.print_final_stats(&stats);

        Ok(RunSummary {
            entries,
            stats,
            report_path,
            total_entries: discovery.total_entries,
        })
    }

    fn log_configuration(&self) {
        info!(
            "Limits: {}px max side, {}KB max size, JPEG quality from {}",
            self.config.max_dim_px, self.config.max_size_kb, self.config.jpeg_quality
        );
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        } else {
            info!("Mode: Replace files in place (no backup)");
        }
    }

    fn print_final_stats(&self, stats: &OptimizationStats) {
        info!("=== Optimization Complete ===");
        info!("Images processed: {}", stats.files_processed);
        info!("Images optimized: {}", stats.files_optimized);
        info!("Images skipped: {}", stats.files_skipped);
        info!(
            "Size: {:.1}KB -> {:.1}KB ({:.2}% reduction)",
            stats.total_original_kb,
            stats.total_optimized_kb,
            stats.overall_reduction_percent()
        );
    }
}
