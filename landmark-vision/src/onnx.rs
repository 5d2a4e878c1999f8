//! `PlaceClassifier` backed by an ONNX model run with `tract`.
//!
//! The model must take a single `f32` input of shape `[1, height, width, 3]`
//! (NHWC, values in `0.0..=1.0`) and produce one output whose values are the
//! class distribution. A model with a single sigmoid output is read as a
//! one-element distribution, which is what single-landmark mode expects.

use camino::{Utf8Path, Utf8PathBuf};
use landmark_core::{ClassifierError, ImageTensor, PlaceClassifier};
use thiserror::Error;
use tract_onnx::prelude::*;

/// Errors raised while loading a model from disk.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// No regular file exists at the configured path.
    #[error("model file {path} does not exist")]
    Missing {
        /// Configured model path.
        path: Utf8PathBuf,
    },
    /// The file exists but could not be turned into a runnable plan.
    #[error("failed to load model {path}: {reason}")]
    Build {
        /// Configured model path.
        path: Utf8PathBuf,
        /// Error reported by the inference runtime.
        reason: String,
    },
}

type Plan = TypedRunnableModel<TypedModel>;

/// ONNX landmark classifier.
///
/// The plan is optimised once at load time and is immutable afterwards, so
/// a single instance serves concurrent requests.
pub struct OnnxPlaceClassifier {
    plan: Plan,
    width: u32,
    height: u32,
    input_shape: [usize; 4],
}

impl std::fmt::Debug for OnnxPlaceClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPlaceClassifier")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl OnnxPlaceClassifier {
    /// Load and optimise the model at `path` for `width × height` input.
    ///
    /// # Errors
    /// Returns [`ModelLoadError::Missing`] when `path` is not a file and
    /// [`ModelLoadError::Build`] when the runtime rejects the model.
    pub fn load(path: &Utf8Path, width: u32, height: u32) -> Result<Self, ModelLoadError> {
        if !landmark_fs::file_is_file(path).unwrap_or(false) {
            return Err(ModelLoadError::Missing {
                path: path.to_path_buf(),
            });
        }
        let build_error = |err: &dyn std::fmt::Display| ModelLoadError::Build {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };
        let rows = usize::try_from(height).map_err(|err| build_error(&err))?;
        let cols = usize::try_from(width).map_err(|err| build_error(&err))?;
        let input_shape = [1, rows, cols, 3];
        let plan = tract_onnx::onnx()
            .model_for_path(path.as_std_path())
            .and_then(|model| model.with_input_fact(0, f32::fact(input_shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|err| build_error(&format!("{err:#}")))?;
        log::info!("loaded classifier model {path} for {width}x{height} input");
        Ok(Self {
            plan,
            width,
            height,
            input_shape,
        })
    }
}

impl PlaceClassifier for OnnxPlaceClassifier {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let shape = input.shape();
        if shape != self.input_shape {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.input_shape,
                found: shape,
            });
        }
        let tensor = match input.as_slice() {
            Some(pixels) => Tensor::from_shape(&shape, pixels),
            None => {
                let pixels: Vec<f32> = input.as_array().iter().copied().collect();
                Tensor::from_shape(&shape, pixels.as_slice())
            }
        }
        .map_err(inference_error)?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(inference_error)?;
        let first = outputs.first().ok_or_else(|| ClassifierError::Inference {
            reason: "model produced no outputs".to_owned(),
        })?;
        let view = first.to_array_view::<f32>().map_err(inference_error)?;
        Ok(view.iter().copied().collect())
    }
}

fn inference_error(err: TractError) -> ClassifierError {
    ClassifierError::Inference {
        reason: format!("{err:#}"),
    }
}
