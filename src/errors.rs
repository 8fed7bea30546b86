use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the Hermine detector.
///
/// Each variant carries the context of the step that failed so the shell can
/// render a meaningful inline message without parsing error strings. A
/// failure only ever ends the request it belongs to.
#[derive(Error, Debug)]
pub enum HermineError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Could not load the model from {path:?}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The image must be in color (RGB): found {channels} channel(s)")]
    ChannelMismatch { channels: u8 },

    #[error("Unsupported image format for {path:?}: expected jpg, jpeg or png")]
    UnsupportedFormat { path: PathBuf },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Inference error: {operation} failed")]
    Inference {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid model output: {reason}")]
    InvalidOutput { reason: String },

    #[error("Unexpected failure: {message}")]
    Unexpected { message: String },
}

pub type Result<T> = std::result::Result<T, HermineError>;

impl HermineError {
    /// Short message suitable for showing in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelLoad { source, .. } => format!("{self}: {source}"),
            Self::ChannelMismatch { .. } | Self::UnsupportedFormat { .. } => self.to_string(),
            Self::Unexpected { .. } => "Something went wrong while analysing the image".to_string(),
            other => format!("Error: {other}"),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that knows the path and operation should construct
/// `HermineError::FileSystem` directly.
impl From<std::io::Error> for HermineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
///
/// Call sites that know the file involved construct
/// `HermineError::ImageProcessing` directly instead.
impl From<image::ImageError> for HermineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ONNX Runtime errors raised during a forward pass.
impl From<ort::Error> for HermineError {
    fn from(err: ort::Error) -> Self {
        Self::Inference {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Shape errors only happen while building or reading tensors, so they are
/// reported as inference failures.
impl From<ndarray::ShapeError> for HermineError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Inference {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}
