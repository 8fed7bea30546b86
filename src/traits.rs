use crate::classification::ClassificationScore;
use crate::errors::{HermineError, Result};
use crate::model::preprocess;
use image::DynamicImage;
use ndarray::prelude::*;

/// Binary image classifier behind the detector.
///
/// Implementations only provide the raw forward pass; preprocessing and score
/// extraction are shared so every backend sees exactly the same tensor.
pub trait ImageClassificationModel: Send + Sync {
    /// Forward pass over a `(batch, height, width, channel)` tensor.
    ///
    /// Returns one row per batch element, one column per model output.
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array2<f32>>;

    /// Preprocess a single image and return its score.
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationScore> {
        let tensor = preprocess(image)?;
        let output = self.predict(tensor.view())?;
        extract_score(output.view())
    }
}

/// Pull the single probability out of a batch-of-one, one-output result.
pub fn extract_score(output: ArrayView2<f32>) -> Result<ClassificationScore> {
    if output.dim() != (1, 1) {
        return Err(HermineError::InvalidOutput {
            reason: format!("expected shape [1, 1], got {:?}", output.shape()),
        });
    }

    let value = output[[0, 0]];
    if !value.is_finite() {
        return Err(HermineError::InvalidOutput {
            reason: format!("score is not a finite number: {value}"),
        });
    }

    Ok(ClassificationScore::new(value))
}
