//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ottimizzazione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `max_dim_px`: Lato massimo in pixel (default: 1800)
//! - `max_size_kb`: Budget di dimensione per file in KB (default: 800)
//! - `jpeg_quality`: Qualità JPEG di partenza (1-100, default: 85)
//! - `dry_run`: Flag per simulazione senza modifiche (default: false)
//! - `report_dir`: Directory dove scrivere il report CSV (default: None = directory corrente)
//! - `record_optimized_dimensions`: Scrive le dimensioni finali nella colonna OptimizedDim (default: false)
//! - `show_progress_bar`: Mostra la progress bar di `indicatif` (default: false)
//!
//! Il floor di qualità (20) e lo step (5) sono fissi, vedi `image_processor`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     max_dim_px: 1200,
//!     max_size_kb: 500.0,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for image optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Images with a side larger than this are downscaled
    pub max_dim_px: u32,
    /// Size budget per file, in KB
    pub max_size_kb: f64,
    /// Starting JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Dry run - don't actually overwrite files
    pub dry_run: bool,
    /// Where the CSV report is written (None = current directory)
    pub report_dir: Option<PathBuf>,
    /// Fill the OptimizedDim report column instead of leaving it empty
    pub record_optimized_dimensions: bool,
    /// Show an indicatif progress bar alongside the log lines
    pub show_progress_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dim_px: 1800,
            max_size_kb: 800.0,
            jpeg_quality: 85,
            dry_run: false,
            report_dir: None,
            record_optimized_dimensions: false,
            show_progress_bar: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(OptimizeError::Validation(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.max_dim_px == 0 {
            return Err(OptimizeError::Validation(
                "Maximum dimension must be greater than 0".to_string(),
            ));
        }

        if !self.max_size_kb.is_finite() || self.max_size_kb <= 0.0 {
            return Err(OptimizeError::Validation(
                "Maximum size in KB must be a positive number".to_string(),
            ));
        }

        if let Some(ref report_dir) = self.report_dir {
            if !report_dir.is_dir() {
                return Err(OptimizeError::Validation(format!(
                    "Report directory does not exist: {}",
                    report_dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.jpeg_quality = 101;
        assert!(config.validate().is_err());

        config.jpeg_quality = 85;
        config.max_dim_px = 0;
        assert!(config.validate().is_err());

        config.max_dim_px = 1800;
        config.max_size_kb = -1.0;
        assert!(matches!(config.validate(), Err(OptimizeError::Validation(_))));

        config.max_size_kb = 800.0;
        config.report_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_dim_px, 1800);
        assert_eq!(config.max_size_kb, 800.0);
        assert_eq!(config.jpeg_quality, 85);
        assert!(!config.dry_run);
        assert!(config.report_dir.is_none());
        assert!(!config.record_optimized_dimensions);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            max_dim_px: 1200,
            max_size_kb: 350.5,
            jpeg_quality: 90,
            dry_run: true,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = Config::from_file(&config_path).unwrap();

        assert_eq!(loaded_config.max_dim_px, 1200);
        assert_eq!(loaded_config.max_size_kb, 350.5);
        assert_eq!(loaded_config.jpeg_quality, 90);
        assert!(loaded_config.dry_run);
    }

    #[test]
    fn test_config_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(config.max_dim_px, 1800);
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{ "max_size_kb": 250.0 }"#).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.max_size_kb, 250.0);
        assert_eq!(config.jpeg_quality, 85);
    }
}
