//! # Progress Tracking Module
//!
//! Contatori della singola esecuzione: immagini visitate, entry totali e
//! tempo trascorso. Niente stato globale: il tracker viene passato per
//! `&mut` lungo l'orchestrazione.

use crate::progress::ProgressManager;
use std::time::{Duration, Instant};

/// Per-run counters used for the `(done/total=pct%)` part of log lines
pub struct ProgressTracker {
    processed_files: usize,
    total_files: usize,
    started: Instant,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    /// `total_files` counts every walked entry for the log lines; the bar
    /// only ticks once per image, so its length is `image_count`.
    pub fn new(total_files: usize, image_count: usize, show_bar: bool) -> Self {
        Self {
            processed_files: 0,
            total_files,
            started: Instant::now(),
            progress_manager: ProgressManager::new(image_count as u64, show_bar),
        }
    }

    /// Count one more visited image, never past the total
    pub fn advance(&mut self) {
        self.processed_files = (self.processed_files + 1).min(self.total_files);
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Integer percentage, truncated
    pub fn percent(&self) -> usize {
        if self.total_files == 0 {
            0
        } else {
            100 * self.processed_files / self.total_files
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `(done/total=pct% in Ns)`
    pub fn status(&self) -> String {
        format!(
            "({}/{}={}% in {}s)",
            self.processed_files,
            self.total_files,
            self.percent(),
            self.elapsed().as_secs()
        )
    }

    /// Aggiorna progress bar con messaggio
    pub fn update_message(&self, message: &str) {
        self.progress_manager.update(message);
    }

    /// Run a log call without tearing the progress bar
    pub fn log<F: FnOnce()>(&self, f: F) {
        self.progress_manager.suspend(f);
    }

    /// Finalizza progress bar
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }
}
