//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva delle immagini in una directory
//! - Conteggio di tutte le entry (usato solo per la percentuale di progresso)
//! - Determinazione formato file dall'estensione (case-insensitive)
//! - Misura delle dimensioni su disco in KB
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Lossy**: JPG, JPEG
//! - **Lossless**: PNG, GIF
//!
//! ## Ordine:
//! I file vengono restituiti nell'ordine in cui `walkdir` li visita, senza
//! nessun ordinamento garantito.
//!
//! ## Esempio:
//! ```rust,ignore
//! let discovery = FileManager::find_image_files("/path/to/uploads")?;
//! for file in &discovery.images {
//!     let size_kb = FileManager::file_size_kb(file)?;
//! }
//! ```

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Encoding family of a supported image, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Lossless formats are re-saved, lossy ones go through the quality loop
    pub fn is_lossless(&self) -> bool {
        matches!(self, ImageKind::Png | ImageKind::Gif)
    }
}

/// Result of walking a directory tree
#[derive(Debug, Default)]
pub struct Discovery {
    /// Every entry below the root, images or not
    pub total_entries: usize,
    /// Supported images in traversal order
    pub images: Vec<PathBuf>,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Walk `root` recursively, counting all entries and collecting images
    pub fn find_image_files(root: &Path) -> Result<Discovery> {
        let mut discovery = Discovery::default();

        for entry in WalkDir::new(root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            discovery.total_entries += 1;

            if entry.file_type().is_file() && Self::is_supported_format(entry.path()) {
                discovery.images.push(entry.into_path());
            }
        }

        Ok(discovery)
    }

    /// Check if a file format is supported
    pub fn is_supported_format(path: &Path) -> bool {
        Self::image_kind(path).is_some()
    }

    /// Classify an image by its extension
    pub fn image_kind(path: &Path) -> Option<ImageKind> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Size on disk in KB (1 KB = 1024 bytes)
    pub fn file_size_kb(path: &Path) -> Result<f64, std::io::Error> {
        Ok(Self::bytes_to_kb(fs::metadata(path)?.len() as usize))
    }

    pub fn bytes_to_kb(len: usize) -> f64 {
        len as f64 / 1024.0
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: f64, new_size: f64) -> f64 {
        if original_size <= 0.0 {
            0.0
        } else {
            ((original_size - new_size) / original_size) * 100.0
        }
    }
}
