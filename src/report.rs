//! # Report Module
//!
//! Questo modulo scrive il report CSV finale dell'esecuzione.
//!
//! ## Responsabilità:
//! - Definisce `LogEntry`, una riga per ogni immagine visitata
//! - Scrive tutte le righe in un unico file `log.<timestamp>.log`
//!
//! ## Formato:
//! ```text
//! Path,OriginalDim,OptimizedDim,OriginalSize,OptimizedSize
//! uploads/a.jpg,2400x1600,,1200.0,781.25
//! uploads/b.png,500x500,,50.0,
//! ```
//! `OptimizedDim` resta vuota a meno di `record_optimized_dimensions`;
//! `OptimizedSize` è vuota per i file saltati.
//!
//! Il report viene scritto solo se l'intera scansione termina senza errori.

use crate::error::OptimizeError;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One report row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "OriginalDim")]
    pub original_dim: String,
    #[serde(rename = "OptimizedDim")]
    pub optimized_dim: Option<String>,
    #[serde(rename = "OriginalSize")]
    pub original_size_kb: f64,
    #[serde(rename = "OptimizedSize")]
    pub optimized_size_kb: Option<f64>,
}

impl LogEntry {
    pub fn new(
        path: &Path,
        original_dimensions: (u32, u32),
        optimized_dimensions: Option<(u32, u32)>,
        original_size_kb: f64,
        optimized_size_kb: Option<f64>,
    ) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            original_dim: format_dimensions(original_dimensions),
            optimized_dim: optimized_dimensions.map(format_dimensions),
            original_size_kb,
            optimized_size_kb,
        }
    }
}

/// `WxH`
pub fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

/// `log.<yy-mm-dd.HH-MM-SS.micros>.log`
pub fn report_file_name() -> String {
    format!("log.{}.log", Local::now().format("%y-%m-%d.%H-%M-%S.%6f"))
}

/// Write `entries` as CSV into `dir` and return the report path
pub fn write_report(dir: &Path, entries: &[LogEntry]) -> Result<PathBuf, OptimizeError> {
    let path = dir.join(report_file_name());
    write_report_to(&path, entries)?;
    info!("Report written to {} ({} rows)", path.display(), entries.len());
    Ok(path)
}

fn write_report_to(path: &Path, entries: &[LogEntry]) -> Result<(), OptimizeError> {
    let mut writer = csv::Writer::from_path(path)?;

    // an empty run still gets a header row
    if entries.is_empty() {
        writer.write_record([
            "Path",
            "OriginalDim",
            "OptimizedDim",
            "OriginalSize",
            "OptimizedSize",
        ])?;
    }

    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}
