use std::path::Path;

use crate::{
    errors::{HermineError, Result},
    traits::ImageClassificationModel,
};
use image::{imageops, imageops::FilterType, DynamicImage, ImageBuffer, Pixel, Primitive, Rgb};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

/// Side length of the square input the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;

/// The classifier only accepts RGB.
pub const INPUT_CHANNELS: u8 = 3;

/// Default location of the exported classifier, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "cat_model_final.onnx";

/// ONNX Runtime backed classifier.
pub struct Model {
    input_name: String,
    output_name: String,
    session: Mutex<Session>,
}

impl Model {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let load_error = |source: ort::Error| HermineError::ModelLoad {
            path: model_path.to_path_buf(),
            source: Box::new(source),
        };

        if !model_path.is_file() {
            return Err(HermineError::ModelLoad {
                path: model_path.to_path_buf(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "model file does not exist",
                )),
            });
        }

        tracing::info!("Loading classification model from {}", model_path.display());

        let mut session = SessionBuilder::new()
            .map_err(load_error)?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(load_error)?
            .with_memory_pattern(true)
            .map_err(load_error)?
            .commit_from_file(model_path)
            .map_err(load_error)?;

        let invalid_model = |reason: String| HermineError::ModelLoad {
            path: model_path.to_path_buf(),
            source: reason.into(),
        };

        let input = session
            .inputs
            .first()
            .ok_or_else(|| invalid_model("model declares no inputs".to_string()))?;
        let input_name = input.name.clone();
        let input_shape = input
            .input_type
            .tensor_shape()
            .map(|shape| shape.to_vec())
            .ok_or_else(|| invalid_model("model input is not a tensor".to_string()))?;
        check_input_shape(&input_shape).map_err(invalid_model)?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| invalid_model("model declares no outputs".to_string()))?;

        tracing::debug!(
            "Model input '{}' {:?}, output '{}'",
            input_name,
            input_shape,
            output_name
        );

        // warm up
        let data = Array4::<f32>::zeros((
            1,
            INPUT_SIZE as usize,
            INPUT_SIZE as usize,
            usize::from(INPUT_CHANNELS),
        ));
        session
            .run(ort::inputs![input_name.as_str() => TensorRef::from_array_view(&data).map_err(load_error)?])
            .map_err(load_error)?;

        tracing::info!("Model loaded");

        Ok(Self {
            input_name,
            output_name,
            session: Mutex::new(session),
        })
    }
}

impl ImageClassificationModel for Model {
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array2<f32>> {
        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(&tensor.as_standard_layout())?
        ])?;
        let scores = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix2>()?
            .to_owned();
        Ok(scores)
    }
}

/// Accepts `[batch, 224, 224, 3]` where unknown dimensions are negative.
fn check_input_shape(shape: &[i64]) -> std::result::Result<(), String> {
    let expected = [
        -1,
        i64::from(INPUT_SIZE),
        i64::from(INPUT_SIZE),
        i64::from(INPUT_CHANNELS),
    ];
    if shape.len() != expected.len() {
        return Err(format!("expected a 4D input, got {shape:?}"));
    }

    let compatible = shape
        .iter()
        .zip(expected)
        .skip(1)
        .all(|(&actual, expected)| actual < 0 || actual == expected);
    if !compatible {
        return Err(format!(
            "expected input shape [N, {INPUT_SIZE}, {INPUT_SIZE}, {INPUT_CHANNELS}], got {shape:?}"
        ));
    }
    Ok(())
}

/// Turn a decoded image into the `(1, 224, 224, 3)` tensor the classifier expects.
///
/// Only three-channel images are accepted. Grayscale and images with an alpha
/// channel are rejected before anything is resized.
pub fn preprocess(image: &DynamicImage) -> Result<Array4<f32>> {
    let channels = image.color().channel_count();
    if channels != INPUT_CHANNELS {
        return Err(HermineError::ChannelMismatch { channels });
    }

    let tensor = match image {
        DynamicImage::ImageRgb8(rgb) => to_tensor(rgb, INPUT_SIZE),
        DynamicImage::ImageRgb16(rgb) => to_tensor(rgb, INPUT_SIZE),
        DynamicImage::ImageRgb32F(rgb) => to_tensor(rgb, INPUT_SIZE),
        other => to_tensor(&other.to_rgb8(), INPUT_SIZE),
    };
    tracing::debug!("Preprocessed tensor shape {:?}", tensor.shape());
    Ok(tensor)
}

/// Resize to `image_size`² and scale every subpixel into [0, 1], channels last.
pub fn to_tensor<S>(image: &ImageBuffer<Rgb<S>, Vec<S>>, image_size: u32) -> Array4<f32>
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Into<f32> + Primitive + 'static,
{
    let image = imageops::resize(image, image_size, image_size, FilterType::CatmullRom);
    let max: f32 = S::DEFAULT_MAX_VALUE.into();

    // (channel, height, width) -> (batch, height, width, channel)
    image
        .as_ndarray3()
        .permuted_axes([1, 2, 0])
        .insert_axis(Axis(0))
        .map(|v| <S as Into<f32>>::into(*v) / max)
}
