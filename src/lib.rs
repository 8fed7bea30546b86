pub mod cache;
pub mod certificate;
pub mod classification;
pub mod config;
pub mod errors;
pub mod model;
pub mod seal;
pub mod traits;

pub mod mocks;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageReader};

pub use cache::ModelCache;
pub use classification::{ClassificationScore, Verdict};
pub use config::Config;
pub use errors::{HermineError, Result};
pub use model::Model;
pub use seal::{CertifiedImage, SealPlacement, SealStyle};
pub use traits::*;

#[cfg(test)]
pub use mocks::*;

/// Builds the model the first time a request needs it.
pub type ModelLoader<M> = Box<dyn Fn() -> Result<M> + Send + Sync>;

/// Result of one successful request: the score and the certified copy.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub score: ClassificationScore,
    pub placement: Option<SealPlacement>,
    pub certified: CertifiedImage,
}

impl Analysis {
    pub fn verdict(&self) -> Verdict {
        self.score.verdict()
    }

    pub fn confidence_percent(&self) -> String {
        self.score.confidence_percent()
    }
}

/// What the shell shows for a request: a result, or a message in its place.
#[derive(Debug)]
pub enum RequestOutcome {
    Certified(Analysis),
    Failed(HermineError),
}

impl RequestOutcome {
    pub fn into_result(self) -> Result<Analysis> {
        match self {
            Self::Certified(analysis) => Ok(analysis),
            Self::Failed(err) => Err(err),
        }
    }

    pub const fn is_certified(&self) -> bool {
        matches!(self, Self::Certified(_))
    }
}

/// Per-request entry point: classify an image and stamp it with a seal.
///
/// The model is loaded lazily by the first request and shared by every
/// request after it.
pub struct HermineDetector<M: ImageClassificationModel> {
    models: ModelCache<M>,
    loader: ModelLoader<M>,
    style: SealStyle,
}

impl<M: ImageClassificationModel> HermineDetector<M> {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<M> + Send + Sync + 'static,
    {
        Self {
            models: ModelCache::new(),
            loader: Box::new(loader),
            style: SealStyle::default(),
        }
    }

    /// Detector around an already loaded model.
    pub fn from_model(model: M) -> Self {
        Self {
            models: ModelCache::with_model(model),
            loader: Box::new(|| {
                Err(HermineError::Configuration {
                    message: "model was provided up front".to_string(),
                })
            }),
            style: SealStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SealStyle) -> Self {
        self.style = style;
        self
    }

    pub fn model(&self) -> Result<Arc<M>> {
        self.models.get_or_load(|| (self.loader)())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.models.is_loaded()
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<ClassificationScore> {
        self.model()?.classify(image)
    }

    pub fn certify(&self, image: &DynamicImage, score: ClassificationScore) -> CertifiedImage {
        seal::composite_with_style(image, score.is_positive(), &self.style)
    }

    /// Classify `image` and produce its certified copy.
    pub fn analyze(&self, image: &DynamicImage) -> Result<Analysis> {
        let score = self.classify(image)?;
        let certified = self.certify(image, score);
        let placement = SealPlacement::for_image(image.width(), image.height(), &self.style);

        tracing::info!(
            "Classified as {} ({}, score {})",
            score.verdict(),
            score.confidence_percent(),
            score
        );
        Ok(Analysis {
            score,
            placement,
            certified,
        })
    }

    /// Same as [`Self::analyze`] for an uploaded file.
    pub fn analyze_file(&self, path: &Path) -> Result<Analysis> {
        if !is_supported_image_format(path) {
            return Err(HermineError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        self.model()?;
        let image = load_image(path)?;
        self.analyze(&image)
    }

    /// Run one request to completion. Every failure, including a panic
    /// inside inference or drawing, is turned into [`RequestOutcome::Failed`].
    pub fn handle(&self, path: &Path) -> RequestOutcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.analyze_file(path)))
            .unwrap_or_else(|payload| {
                Err(HermineError::Unexpected {
                    message: panic_message(payload.as_ref()),
                })
            });

        match outcome {
            Ok(analysis) => RequestOutcome::Certified(analysis),
            Err(err) => {
                tracing::warn!("Request for {} failed: {}", path.display(), err);
                RequestOutcome::Failed(err)
            }
        }
    }
}

impl HermineDetector<Model> {
    /// Detector backed by the ONNX model named in `config`, loaded on first use.
    pub fn with_onnx_model(config: &Config) -> Self {
        let model_path = config.model_path.clone();
        let device_id = config.device_id;
        Self::new(move || Model::new(&model_path, device_id))
    }
}

/// Uploads are limited to the formats the model was meant to see.
pub fn is_supported_image_format(path: &Path) -> bool {
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        matches!(extension.to_lowercase().as_str(), "jpg" | "jpeg" | "png")
    } else {
        false
    }
}

/// Decode an image file, trusting its content over its extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| HermineError::FileSystem {
            path: path.to_path_buf(),
            operation: "open image".to_string(),
            source: e,
        })?;
    reader.decode().map_err(|e| HermineError::ImageProcessing {
        path: path.display().to_string(),
        operation: "image decoding".to_string(),
        source: Box::new(e),
    })
}

/// Decode an in-memory upload.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| HermineError::ImageProcessing {
        path: "<upload>".to_string(),
        operation: "image decoding".to_string(),
        source: Box::new(e),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
