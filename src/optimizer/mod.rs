//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `media_optimizer`: Orchestratore principale della cartella
//! - `task_optimizer`: Worker per singoli file
//! - `progress_tracker`: Contatori di progresso della singola esecuzione

pub mod media_optimizer;
pub mod task_optimizer;
pub mod progress_tracker;

pub use media_optimizer::{MediaOptimizer, RunSummary};
pub use task_optimizer::{ImageTask, OptimizationResult, TaskOptimizer};
pub use progress_tracker::ProgressTracker;
