//! Facade crate for the landmark photo verifier.
//!
//! This crate re-exports the core domain types and exposes the image
//! pipeline and ONNX classifier behind feature flags.

#![forbid(unsafe_code)]

pub use landmark_core::{
    ClassLabel, ClassificationError, ClassificationResult, ClassifierError, CoordinateError,
    EngineConfigError, GeoCoordinate, Identification, ImageTensor, LandmarkEntry,
    LandmarkRegistry, LocationCheck, Outcome, PlaceClassifier, ReferencePoint, RegistryError,
    UnknownClass, VerificationEngine, VerificationMode, VerificationState, VerificationVerdict,
    geodesic_distance,
};

#[cfg(feature = "vision")]
pub use landmark_vision::{ImageDecodeError, ImageNormaliser};

#[cfg(feature = "onnx")]
pub use landmark_vision::{ModelLoadError, OnnxPlaceClassifier};
