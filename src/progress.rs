//! # Progress Bar and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche di ottimizzazione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` (opzionale, nascosta di default)
//! - Stampa delle righe di log senza rompere la barra (`suspend`)
//! - Tracking statistiche di ottimizzazione (file processati, ottimizzati, skipped)
//! - Calcolo percentuale di riduzione e KB risparmiati
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale immagini visitate
//! - **files_optimized**: Immagini riscritte
//! - **files_skipped**: Immagini già sotto soglia
//! - **total_original_kb** / **total_optimized_kb**: Somme in KB
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(total_files, config.show_progress_bar);
//! let mut stats = OptimizationStats::new();
//!
//! stats.add_optimized(1200.0, 780.0);
//! progress.update("photo.jpg");
//!
//! progress.finish(&stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Manages the optional progress bar for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager, hidden unless `visible`
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::hidden()),
            };
        }

        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Run `f` (typically a log call) with the bar temporarily cleared
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    #[cfg(test)]
    pub(crate) fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Statistics tracker for optimization results
#[derive(Debug, Default)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub files_skipped: usize,
    pub total_original_kb: f64,
    pub total_optimized_kb: f64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_optimized(&mut self, original_kb: f64, new_kb: f64) {
        self.files_processed += 1;
        self.files_optimized += 1;
        self.total_original_kb += original_kb;
        self.total_optimized_kb += new_kb;
    }

    pub fn add_skipped(&mut self, original_kb: f64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_kb += original_kb;
        self.total_optimized_kb += original_kb;
    }

    pub fn saved_kb(&self) -> f64 {
        (self.total_original_kb - self.total_optimized_kb).max(0.0)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_kb, self.total_optimized_kb)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} images | Optimized: {} | Skipped: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.files_skipped,
            FileManager::format_size((self.saved_kb() * 1024.0) as u64),
            self.overall_reduction_percent()
        )
    }
}
