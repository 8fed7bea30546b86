use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::Result;
use crate::traits::ImageClassificationModel;
use ndarray::prelude::*;

/// Test double that returns the same score for every image and counts how
/// often the forward pass was invoked.
#[derive(Debug)]
pub struct MockClassifier {
    pub score: f32,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub const fn new(score: f32) -> Self {
        Self {
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassificationModel for MockClassifier {
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array2<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Array2::from_elem((tensor.shape()[0], 1), self.score))
    }
}

/// Mock that always answers "it's Hermine" with 90% confidence.
pub const fn create_mock_classifier() -> MockClassifier {
    MockClassifier::new(0.9)
}
