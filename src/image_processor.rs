//! # Image Processor Module
//!
//! Questo modulo contiene il cuore dell'ottimizzazione: resize e ricompressione.
//!
//! ## Responsabilità:
//! - Decodifica dell'immagine con il crate `image`
//! - **Normalizzazione dimensioni**: se un lato supera `max_dim_px` l'immagine
//!   viene ridotta mantenendo l'aspect ratio (solo riduzione, mai ingrandimento)
//! - **Path lossless** (PNG/GIF): ricompressione con il massimo sforzo
//! - **Path lossy** (JPEG): loop di convergenza che abbassa la qualità a step
//!   fissi finché il file non rientra nel budget o si raggiunge il floor
//!
//! ## Loop di convergenza JPEG:
//! ```text
//! quality = 85
//! while size_kb > max_size_kb && quality > 20:
//!     quality -= 5          (mai sotto 20)
//!     encode in memoria     (nessun file temporaneo su disco)
//!     size_kb = len / 1024
//! ```
//! Al massimo 13 iterazioni partendo da 85. Raggiungere il floor non è un
//! errore: viene restituito il miglior risultato ottenuto.
//!
//! ## Invariante aspect ratio:
//! Dopo il resize `|nuovo - originale| / originale < 0.01`, altrimenti
//! `OptimizeError::AspectRatioViolation`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = ImageProcessor::new(config);
//! let optimized = processor.optimize(&path, ImageKind::Jpeg, 1200.0)?;
//! if let Some(bytes) = optimized.encoded {
//!     std::fs::write(&path, bytes)?;
//! }
//! ```

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::{FileManager, ImageKind};
use image::codecs::gif::GifEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, Frame, ImageError, ImageReader};
use mozjpeg::{ColorSpace, Compress};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error};

/// Lowest JPEG quality the convergence loop will try
pub const QUALITY_FLOOR: u8 = 20;
/// Fixed quality decrement per iteration
pub const QUALITY_STEP: u8 = 5;
/// Maximum relative aspect ratio drift allowed after a resize
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Outcome of the JPEG quality-stepping loop
#[derive(Debug)]
pub struct JpegOutcome {
    /// Last encoded buffer, `None` if the loop never ran
    pub encoded: Option<Vec<u8>>,
    /// Quality of the last encode (or the starting quality)
    pub quality: u8,
    /// Size of `encoded`, or the measured input size if the loop never ran
    pub size_kb: f64,
    pub iterations: usize,
}

/// Re-encoded image ready to be written over the original
#[derive(Debug)]
pub struct OptimizedImage {
    /// New file content, `None` when there was nothing worth writing
    pub encoded: Option<Vec<u8>>,
    pub dimensions: (u32, u32),
    pub resized: bool,
    /// Final JPEG quality, `None` for lossless formats
    pub final_quality: Option<u8>,
}

/// Decodes, downscales and re-encodes single images in memory.
pub struct ImageProcessor {
    config: Config,
}

impl ImageProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one file: decode, normalize, re-encode.
    ///
    /// `original_size_kb` seeds the JPEG loop, so the first iteration always
    /// compares against the size of the file on disk.
    pub fn optimize(
        &self,
        path: &Path,
        kind: ImageKind,
        original_size_kb: f64,
    ) -> Result<OptimizedImage, OptimizeError> {
        let image = Self::open(path)?;
        let (image, resized) = self.normalize_dimensions(image, path)?;
        let dimensions = (image.width(), image.height());

        if kind.is_lossless() {
            let encoded = Self::encode_lossless(&image, kind, path).inspect_err(|_| {
                error!("Error in optimizing image: {}", path.display());
            })?;
            return Ok(OptimizedImage {
                encoded: Some(encoded),
                dimensions,
                resized,
                final_quality: None,
            });
        }

        let outcome = self.compress_jpeg_to_size(&image, path, original_size_kb)?;
        debug!(
            "{}: JPEG loop ran {} iteration(s), final quality {} ({:.1}KB)",
            path.display(),
            outcome.iterations,
            outcome.quality,
            outcome.size_kb
        );

        let encoded = match outcome.encoded {
            Some(bytes) => Some(bytes),
            // Under budget already but downscaled: the new pixels still need writing
            None if resized => Some(Self::encode_jpeg(&image, outcome.quality, path)?),
            None => None,
        };

        Ok(OptimizedImage {
            encoded,
            dimensions,
            resized,
            final_quality: Some(outcome.quality),
        })
    }

    /// Decode an image from disk.
    ///
    /// The decoder is picked from the file content, not the extension, so a
    /// PNG uploaded as `.jpg` still opens.
    pub fn open(path: &Path) -> Result<DynamicImage, OptimizeError> {
        Self::reader(path)?
            .decode()
            .map_err(|source| decode_error(path, source))
    }

    /// Read only the header to get width and height
    pub fn dimensions(path: &Path) -> Result<(u32, u32), OptimizeError> {
        Self::reader(path)?
            .into_dimensions()
            .map_err(|source| decode_error(path, source))
    }

    fn reader(path: &Path) -> Result<ImageReader<BufReader<File>>, OptimizeError> {
        ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_error(path, ImageError::IoError(e)))
    }

    /// Shrink `image` so that its larger side equals `max_dim_px`.
    ///
    /// Images already within bounds are returned untouched. Returns the
    /// (possibly new) image and whether a resize happened.
    pub fn normalize_dimensions(
        &self,
        image: DynamicImage,
        path: &Path,
    ) -> Result<(DynamicImage, bool), OptimizeError> {
        let max_dim = self.config.max_dim_px;
        let original = (image.width(), image.height());

        if original.0 <= max_dim && original.1 <= max_dim {
            return Ok((image, false));
        }

        let resized = image.resize(max_dim, max_dim, FilterType::Lanczos3);
        let new = (resized.width(), resized.height());
        debug!(
            "Resized {} from {}x{} to {}x{}",
            path.display(),
            original.0,
            original.1,
            new.0,
            new.1
        );

        check_aspect_ratio(original, new, path)?;
        Ok((resized, true))
    }

    /// Lossless re-encode with maximum compression effort
    pub fn encode_lossless(
        image: &DynamicImage,
        kind: ImageKind,
        path: &Path,
    ) -> Result<Vec<u8>, OptimizeError> {
        let mut buffer = Vec::new();

        let result = match kind {
            ImageKind::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                image.write_with_encoder(encoder)
            }
            // speed 1 = slowest quantization, best palette; the GIF trailer
            // is written when the temporary encoder drops
            ImageKind::Gif => GifEncoder::new_with_speed(&mut buffer, 1)
                .encode_frame(Frame::new(image.to_rgba8())),
            ImageKind::Jpeg => {
                return Err(OptimizeError::UnsupportedFormat(format!(
                    "JPEG has no lossless path: {}",
                    path.display()
                )));
            }
        };

        result.map_err(|source| OptimizeError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(buffer)
    }

    /// Encode as JPEG at `quality` into a new buffer.
    ///
    /// Uses mozjpeg with optimized Huffman tables (optimize-on-save), which
    /// gives smaller files than the plain baseline encoder at the same quality.
    pub fn encode_jpeg(
        image: &DynamicImage,
        quality: u8,
        path: &Path,
    ) -> Result<Vec<u8>, OptimizeError> {
        let rgb;
        let (color_space, pixels) = match image {
            DynamicImage::ImageLuma8(gray) => (ColorSpace::JCS_GRAYSCALE, gray.as_raw()),
            DynamicImage::ImageRgb8(rgb8) => (ColorSpace::JCS_RGB, rgb8.as_raw()),
            other => {
                rgb = other.to_rgb8();
                (ColorSpace::JCS_RGB, rgb.as_raw())
            }
        };

        let mut comp = Compress::new(color_space);
        comp.set_size(image.width() as usize, image.height() as usize);
        comp.set_quality(quality as f32);
        comp.set_optimize_coding(true);

        run_mozjpeg(comp, pixels).map_err(|e| OptimizeError::Encode {
            path: path.to_path_buf(),
            source: ImageError::IoError(e),
        })
    }

    /// Step JPEG quality down until the encoded size fits `max_size_kb`
    /// or the quality floor is reached.
    ///
    /// Every iteration re-encodes the same source pixels, so quality loss
    /// does not compound between steps.
    pub fn compress_jpeg_to_size(
        &self,
        image: &DynamicImage,
        path: &Path,
        size_kb: f64,
    ) -> Result<JpegOutcome, OptimizeError> {
        let source = Self::jpeg_compatible(image);
        let mut outcome = JpegOutcome {
            encoded: None,
            quality: self.config.jpeg_quality,
            size_kb,
            iterations: 0,
        };

        while outcome.size_kb > self.config.max_size_kb && outcome.quality > QUALITY_FLOOR {
            outcome.quality = outcome
                .quality
                .saturating_sub(QUALITY_STEP)
                .max(QUALITY_FLOOR);

            let buffer = Self::encode_jpeg(&source, outcome.quality, path)?;
            outcome.size_kb = FileManager::bytes_to_kb(buffer.len());
            outcome.encoded = Some(buffer);
            outcome.iterations += 1;

            debug!(
                "{}: quality {} -> {:.1}KB",
                path.display(),
                outcome.quality,
                outcome.size_kb
            );
        }

        Ok(outcome)
    }

    /// Convert once up front so every loop iteration encodes without copying
    fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
        match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        }
    }
}

fn run_mozjpeg(comp: Compress, pixels: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut writer = comp.start_compress(Vec::new())?;
    writer.write_scanlines(pixels)?;
    writer.finish()
}

fn decode_error(path: &Path, source: ImageError) -> OptimizeError {
    OptimizeError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

/// Aspect ratio as height / width
fn aspect_ratio((width, height): (u32, u32)) -> f64 {
    height as f64 / width as f64
}

/// Fail when a resize moved the aspect ratio by 1% or more
pub fn check_aspect_ratio(
    original: (u32, u32),
    resized: (u32, u32),
    path: &Path,
) -> Result<(), OptimizeError> {
    let original_aspect = aspect_ratio(original);
    let resized_aspect = aspect_ratio(resized);

    if (resized_aspect - original_aspect).abs() / original_aspect < ASPECT_TOLERANCE {
        Ok(())
    } else {
        Err(OptimizeError::AspectRatioViolation {
            path: path.to_path_buf(),
            original_aspect,
            resized_aspect,
        })
    }
}
