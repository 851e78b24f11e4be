//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di singole immagini.
//! Misura il file, decide se saltarlo, altrimenti lo ottimizza e lo
//! sovrascrive nel path originale (nessun backup).

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::{FileManager, ImageKind},
    image_processor::ImageProcessor,
    optimizer::progress_tracker::ProgressTracker,
    report::LogEntry,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A discovered image, measured before any change
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTask {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub original_size_kb: f64,
    pub original_dimensions: (u32, u32),
}

/// What happened to one image. All `None` means it was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationResult {
    pub optimized_size_kb: Option<f64>,
    pub optimized_dimensions: Option<(u32, u32)>,
    pub final_quality: Option<u8>,
}

impl OptimizationResult {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_skipped(&self) -> bool {
        self.optimized_size_kb.is_none()
    }
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer {
    config: Config,
    image_processor: ImageProcessor,
}

impl TaskOptimizer {
    pub fn new(config: Config) -> Self {
        let image_processor = ImageProcessor::new(config.clone());
        Self {
            config,
            image_processor,
        }
    }

    /// Processa un singolo file.
    ///
    /// Any error is logged with the file path and returned; the caller is
    /// expected to stop the batch.
    pub fn process_single_file(
        &self,
        path: &Path,
        tracker: &mut ProgressTracker,
    ) -> Result<(ImageTask, OptimizationResult), OptimizeError> {
        let task = self.measure(path).inspect_err(|e| {
            error!("Error in opening file {}: {}", path.display(), e);
        })?;
        tracker.advance();

        if !self.needs_optimization(&task) {
            tracker.log(|| {
                info!("{}({}KB) is small!", path.display(), task.original_size_kb as u64);
            });
            tracker.update_message(&format!("[SKIP] {}", display_name(path)));
            return Ok((task, OptimizationResult::skipped()));
        }

        let result = self.optimize_image(&task, tracker).inspect_err(|e| {
            error!("Error in opening file {}: {}", path.display(), e);
        })?;
        Ok((task, result))
    }

    /// Size on disk and header dimensions
    pub fn measure(&self, path: &Path) -> Result<ImageTask, OptimizeError> {
        let kind = FileManager::image_kind(path).ok_or_else(|| {
            OptimizeError::UnsupportedFormat(path.display().to_string())
        })?;
        let original_size_kb = FileManager::file_size_kb(path)?;
        let original_dimensions = ImageProcessor::dimensions(path)?;

        Ok(ImageTask {
            path: path.to_path_buf(),
            kind,
            original_size_kb,
            original_dimensions,
        })
    }

    /// Over the size budget or over the dimension cap
    pub fn needs_optimization(&self, task: &ImageTask) -> bool {
        let (width, height) = task.original_dimensions;
        task.original_size_kb > self.config.max_size_kb || width.max(height) > self.config.max_dim_px
    }

    fn optimize_image(
        &self,
        task: &ImageTask,
        tracker: &ProgressTracker,
    ) -> Result<OptimizationResult, OptimizeError> {
        let optimized =
            self.image_processor
                .optimize(&task.path, task.kind, task.original_size_kb)?;

        let optimized_size_kb = match optimized.encoded {
            Some(bytes) if !self.config.dry_run => {
                fs::write(&task.path, &bytes)?;
                FileManager::file_size_kb(&task.path)?
            }
            Some(bytes) => {
                debug!("Dry run: would overwrite {}", task.path.display());
                FileManager::bytes_to_kb(bytes.len())
            }
            None => {
                debug!("Nothing to write for {}", task.path.display());
                task.original_size_kb
            }
        };

        let (ow, oh) = task.original_dimensions;
        let (nw, nh) = optimized.dimensions;
        tracker.log(|| {
            info!(
                "{}({}KB[{}x{}]) >> ({}KB[{}x{}]) {}",
                task.path.display(),
                task.original_size_kb as u64,
                ow,
                oh,
                optimized_size_kb as u64,
                nw,
                nh,
                tracker.status()
            );
        });
        tracker.update_message(&format!(
            "[OK] {}: {:.1}% saved",
            display_name(&task.path),
            FileManager::calculate_reduction(task.original_size_kb, optimized_size_kb)
        ));

        Ok(OptimizationResult {
            optimized_size_kb: Some(optimized_size_kb),
            optimized_dimensions: Some(optimized.dimensions),
            final_quality: optimized.final_quality,
        })
    }

    /// Report row for a processed file
    pub fn log_entry(&self, task: &ImageTask, result: &OptimizationResult) -> LogEntry {
        let optimized_dimensions = if self.config.record_optimized_dimensions {
            result.optimized_dimensions
        } else {
            None
        };

        LogEntry::new(
            &task.path,
            task.original_dimensions,
            optimized_dimensions,
            task.original_size_kb,
            result.optimized_size_kb,
        )
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processor::tests::noisy_image;
    use crate::image_processor::QUALITY_FLOOR;
    use image::DynamicImage;
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, img: &DynamicImage, quality: u8) {
        let bytes = ImageProcessor::encode_jpeg(img, quality, path).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn optimizer(max_dim_px: u32, max_size_kb: f64) -> TaskOptimizer {
        TaskOptimizer::new(Config {
            max_dim_px,
            max_size_kb,
            ..Default::default()
        })
    }

    #[test]
    fn test_small_image_is_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("small.png");
        noisy_image(50, 50).save(&path).unwrap();
        let before = fs::read(&path).unwrap();

        let mut tracker = ProgressTracker::new(1, 1, false);
        let (task, result) = optimizer(1800, 800.0)
            .process_single_file(&path, &mut tracker)
            .unwrap();

        assert!(result.is_skipped());
        assert_eq!(result, OptimizationResult::skipped());
        assert_eq!(task.original_dimensions, (50, 50));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(tracker.processed_files(), 1);
    }

    #[test]
    fn test_oversized_jpeg_is_downscaled_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.JPG");
        write_jpeg(&path, &noisy_image(600, 400), 95);

        let mut tracker = ProgressTracker::new(1, 1, false);
        let (task, result) = optimizer(450, 10_000.0)
            .process_single_file(&path, &mut tracker)
            .unwrap();

        assert_eq!(task.kind, ImageKind::Jpeg);
        assert_eq!(result.optimized_dimensions, Some((450, 300)));
        // under budget: written once at the starting quality
        assert_eq!(result.final_quality, Some(85));
        assert_eq!(ImageProcessor::dimensions(&path).unwrap(), (450, 300));
        assert_eq!(
            result.optimized_size_kb,
            Some(FileManager::file_size_kb(&path).unwrap())
        );
    }

    #[test]
    fn test_over_budget_jpeg_converges_or_hits_floor() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("heavy.jpeg");
        write_jpeg(&path, &noisy_image(300, 200), 95);
        let original_kb = FileManager::file_size_kb(&path).unwrap();
        assert!(original_kb > 20.0);

        let mut tracker = ProgressTracker::new(1, 1, false);
        let (_, result) = optimizer(1800, 20.0)
            .process_single_file(&path, &mut tracker)
            .unwrap();

        let final_kb = result.optimized_size_kb.unwrap();
        let quality = result.final_quality.unwrap();
        assert!(final_kb <= 20.0 || quality == QUALITY_FLOOR);
        assert!((QUALITY_FLOOR..=85).contains(&quality));
        assert_eq!(final_kb, FileManager::file_size_kb(&path).unwrap());
        assert!(final_kb < original_kb);
    }

    #[test]
    fn test_png_with_jpeg_extension_is_processed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actually_png.jpg");
        let png = ImageProcessor::encode_lossless(&noisy_image(2000, 100), ImageKind::Png, &path).unwrap();
        fs::write(&path, png).unwrap();

        let mut tracker = ProgressTracker::new(1, 1, false);
        let (task, result) = optimizer(1800, 800.0)
            .process_single_file(&path, &mut tracker)
            .unwrap();

        assert_eq!(task.original_dimensions, (2000, 100));
        assert_eq!(task.kind, ImageKind::Jpeg);
        assert_eq!(result.optimized_dimensions, Some((1800, 90)));
        // written back through the JPEG path, as its extension says
        assert_eq!(
            image::guess_format(&fs::read(&path).unwrap()).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_oversized_png_stays_lossless() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.png");
        noisy_image(600, 400).save(&path).unwrap();

        let mut tracker = ProgressTracker::new(1, 1, false);
        let (_, result) = optimizer(450, 800.0)
            .process_single_file(&path, &mut tracker)
            .unwrap();

        assert_eq!(result.final_quality, None);
        assert_eq!(result.optimized_dimensions, Some((450, 300)));
        let reopened = image::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (450, 300));
        assert_eq!(
            image::guess_format(&fs::read(&path).unwrap()).unwrap(),
            image::ImageFormat::Png
        );
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("again.jpg");
        write_jpeg(&path, &noisy_image(600, 400), 90);
        let task_optimizer = optimizer(450, 10_000.0);

        let mut tracker = ProgressTracker::new(2, 2, false);
        let (_, first) = task_optimizer.process_single_file(&path, &mut tracker).unwrap();
        assert!(!first.is_skipped());
        let after_first = fs::read(&path).unwrap();

        let (_, second) = task_optimizer.process_single_file(&path, &mut tracker).unwrap();
        assert!(second.is_skipped());
        assert_eq!(fs::read(&path).unwrap(), after_first);
        assert_eq!(tracker.processed_files(), 2);
    }

    #[test]
    fn test_dry_run_does_not_touch_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dry.jpg");
        write_jpeg(&path, &noisy_image(600, 400), 95);
        let before = fs::read(&path).unwrap();

        let task_optimizer = TaskOptimizer::new(Config {
            max_dim_px: 450,
            max_size_kb: 10_000.0,
            dry_run: true,
            ..Default::default()
        });
        let mut tracker = ProgressTracker::new(1, 1, false);
        let (_, result) = task_optimizer.process_single_file(&path, &mut tracker).unwrap();

        assert!(result.optimized_size_kb.is_some());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_log_entry_keeps_optimized_dim_empty_by_default() {
        let task = ImageTask {
            path: PathBuf::from("uploads/a.jpg"),
            kind: ImageKind::Jpeg,
            original_size_kb: 1200.0,
            original_dimensions: (2400, 1600),
        };
        let result = OptimizationResult {
            optimized_size_kb: Some(790.0),
            optimized_dimensions: Some((1800, 1200)),
            final_quality: Some(60),
        };

        let entry = optimizer(1800, 800.0).log_entry(&task, &result);
        assert_eq!(entry.original_dim, "2400x1600");
        assert_eq!(entry.optimized_dim, None);
        assert_eq!(entry.original_size_kb, 1200.0);
        assert_eq!(entry.optimized_size_kb, Some(790.0));

        let recording = TaskOptimizer::new(Config {
            record_optimized_dimensions: true,
            ..Default::default()
        });
        let entry = recording.log_entry(&task, &result);
        assert_eq!(entry.optimized_dim.as_deref(), Some("1800x1200"));
    }

    #[test]
    fn test_corrupt_image_is_a_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.gif");
        fs::write(&path, b"definitely not a gif").unwrap();

        let mut tracker = ProgressTracker::new(1, 1, false);
        let err = optimizer(1800, 800.0)
            .process_single_file(&path, &mut tracker)
            .unwrap_err();

        assert!(matches!(err, OptimizeError::Decode { .. }));
        assert_eq!(tracker.processed_files(), 0);
    }

    #[test]
    fn test_needs_optimization_thresholds() {
        let task_optimizer = optimizer(1800, 800.0);
        let mut task = ImageTask {
            path: PathBuf::from("b.png"),
            kind: ImageKind::Png,
            original_size_kb: 800.0,
            original_dimensions: (1800, 500),
        };
        // equal to the limits is still small
        assert!(!task_optimizer.needs_optimization(&task));

        task.original_size_kb = 800.1;
        assert!(task_optimizer.needs_optimization(&task));

        task.original_size_kb = 50.0;
        task.original_dimensions = (500, 1801);
        assert!(task_optimizer.needs_optimization(&task));
    }
}
