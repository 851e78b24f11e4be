//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Porta sempre con sé il path del file che ha causato l'errore
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, sovrascrittura)
//! - `Decode`: Immagine non apribile o corrotta
//! - `Encode`: Errore durante la ricompressione (PNG/GIF/JPEG)
//! - `AspectRatioViolation`: Il resize ha alterato l'aspect ratio oltre l'1%
//! - `Report`: Errore nella scrittura del report CSV
//! - `Validation`: Errori di validazione della configurazione
//!
//! ## Propagazione:
//! Nessun errore viene recuperato: il primo file che fallisce interrompe
//! l'intero batch e il report CSV non viene scritto.
//!
//! ## Esempio:
//! ```rust,ignore
//! let img = image::open(path).map_err(|source| OptimizeError::Decode {
//!     path: path.to_path_buf(),
//!     source,
//! })?;
//! ```

use std::path::PathBuf;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "Aspect ratio drifted for {}: {original_aspect:.5} -> {resized_aspect:.5}",
        .path.display()
    )]
    AspectRatioViolation {
        path: PathBuf,
        original_aspect: f64,
        resized_aspect: f64,
    },

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl OptimizeError {
    /// Path of the file that caused the error, when known
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            OptimizeError::Decode { path, .. }
            | OptimizeError::Encode { path, .. }
            | OptimizeError::AspectRatioViolation { path, .. } => Some(path),
            _ => None,
        }
    }
}
