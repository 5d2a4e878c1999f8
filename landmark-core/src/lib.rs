//! Core domain types for the landmark verifier.
//!
//! A verification request pairs a photo with the coordinate it was
//! supposedly taken at. This crate owns everything that turns the classifier's
//! probability distribution and the submitted coordinate into a verdict:
//!
//! - [`ClassLabel`], [`GeoCoordinate`] and [`geodesic_distance`] model the
//!   inputs.
//! - [`LandmarkRegistry`] holds the reference data for each landmark and is
//!   read-only once built.
//! - [`PlaceClassifier`] is the seam for the image classifier, fed with an
//!   [`ImageTensor`].
//! - [`VerificationEngine`] fuses both signals into a
//!   [`VerificationVerdict`].
//!
//! Constructors validate their input and return `Result` so invalid data is
//! rejected at the boundary rather than deep inside the engine.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod classification;
pub mod coordinate;
pub mod engine;
pub mod label;
pub mod registry;
pub mod tensor;
pub mod test_support;

pub use classification::{
    ClassificationError, ClassificationResult, ClassifierError, PlaceClassifier,
};
pub use coordinate::{CoordinateError, CoordinateField, GeoCoordinate, geodesic_distance};
pub use engine::{
    DEFAULT_ACCEPTANCE_THRESHOLD, EngineConfigError, Identification, LocationCheck, Outcome,
    VerificationEngine, VerificationMode, VerificationState, VerificationVerdict,
};
pub use label::ClassLabel;
pub use registry::{
    LandmarkEntry, LandmarkRegistry, ReferencePoint, RegistryBuilder, RegistryError, UnknownClass,
};
pub use tensor::{ImageTensor, TensorShapeError};
