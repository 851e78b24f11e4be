//! # Utility Functions Module
//!
//! This module provides small helpers shared across the application.

use std::time::{Duration, Instant};
use tracing::info;

/// Runs a unit of work and measures how long it took.
///
/// Logs `"<label> started"` before running `work` and
/// `"<label> executed in <seconds> seconds"` after it returns. The wrapper
/// knows nothing about what it times, so it can wrap any call.
///
/// # Arguments
/// - `label`: Name shown in the two log lines
/// - `work`: The closure to run
///
/// # Returns
/// - `(T, Duration)`: Whatever `work` returned, plus the elapsed wall time
///
/// # Example
/// ```rust,ignore
/// use crate::utils::timed;
///
/// let (result, elapsed) = timed("process_folder(uploads)", || optimizer.run());
/// let summary = result?;
/// ```
pub fn timed<T, F>(label: &str, work: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    info!("{} started", label);
    let start = Instant::now();
    let result = work();
    let elapsed = start.elapsed();
    info!("{} executed in {:.3} seconds", label, elapsed.as_secs_f64());
    (result, elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_result() {
        let (value, _) = timed("answer", || 6 * 7);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_timed_measures_duration() {
        let (_, elapsed) = timed("sleep", || std::thread::sleep(Duration::from_millis(20)));
        assert!(elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn test_timed_passes_errors_through() {
        let (result, _) = timed("fail", || -> Result<(), String> { Err("boom".to_string()) });
        assert_eq!(result, Err("boom".to_string()));
    }
}
