//! Image handling for the landmark verifier.
//!
//! [`ImageNormaliser`] turns uploaded bytes into the `[1, height, width, 3]`
//! tensor a [`landmark_core::PlaceClassifier`] consumes. With the `onnx`
//! feature, [`OnnxPlaceClassifier`] runs an ONNX model through `tract`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod normalise;
#[cfg(feature = "onnx")]
#[cfg_attr(docsrs, doc(cfg(feature = "onnx")))]
pub mod onnx;
pub mod test_support;

pub use normalise::{DEFAULT_INPUT_SIZE, ImageDecodeError, ImageNormaliser, TargetSizeError};
#[cfg(feature = "onnx")]
pub use onnx::{ModelLoadError, OnnxPlaceClassifier};
