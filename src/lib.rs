//! # In-place Image Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Discovery ricorsiva delle immagini e misure su disco
//! - `image_processor`: Resize, ricompressione lossless e loop di qualità JPEG
//! - `optimizer`: Orchestratore del processo, un file alla volta
//! - `progress`: Progress bar e statistiche
//! - `report`: Report CSV finale
//! - `utils`: Wrapper di misura dei tempi
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use inplace_image_optimizer::{Config, MediaOptimizer};
//!
//! let config = Config::default();
//! let optimizer = MediaOptimizer::new(&path, config)?;
//! let summary = optimizer.run()?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod optimizer;
pub mod progress;
pub mod report;
pub mod utils;

pub use config::Config;
pub use error::OptimizeError;
pub use optimizer::{MediaOptimizer, RunSummary};
pub use report::LogEntry;
