//! Verification decision engine.
//!
//! The engine combines the classifier's interpretation of a photo with a
//! geodesic check of the submitted coordinate. It holds no per-request state:
//! every call takes its inputs by reference and returns a fresh verdict, so
//! one engine can serve concurrent requests.
//!
//! Two deployment shapes share the same engine:
//!
//! - [`VerificationMode::MultiLandmark`] takes the argmax of the
//!   distribution. The photo is valid when the detected label is a registered
//!   landmark, located or catalogue-only. Confidence is reported but never
//!   gates acceptance.
//! - [`VerificationMode::SingleLandmark`] serves a registry with exactly one
//!   landmark and a classifier emitting one score. The photo is valid when
//!   that score exceeds the acceptance threshold.

mod state;
mod verdict;

use std::sync::Arc;

use thiserror::Error;

pub use state::{Outcome, VerificationState};
pub use verdict::{
    CONFIDENCE_DECIMALS, DISTANCE_DECIMALS, Identification, LocationCheck, VerificationVerdict,
};

use crate::{ClassLabel, ClassificationError, ClassificationResult, GeoCoordinate, LandmarkRegistry};

/// Score a single-landmark classifier must exceed for the photo to match.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f32 = 0.5;

/// How the engine reads classifier output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationMode {
    /// Several landmarks, one probability per label.
    MultiLandmark,
    /// One landmark, one score.
    SingleLandmark {
        /// The photo matches when its score is strictly greater than this.
        acceptance_threshold: f32,
    },
}

impl VerificationMode {
    /// Single-landmark mode with the default threshold.
    #[must_use]
    pub const fn single() -> Self {
        Self::SingleLandmark {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

/// Errors raised when an engine is configured inconsistently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineConfigError {
    /// Single-landmark mode needs exactly one registered landmark.
    #[error("single-landmark mode requires exactly one landmark, found {found}")]
    SingleLandmarkCount {
        /// Number of landmarks in the registry.
        found: usize,
    },
    /// Single-landmark models emit one score and have no unknown class.
    #[error("single-landmark mode has no unknown class, but label {label} is configured as one")]
    UnknownLabelInSingleMode {
        /// Configured unknown-class label.
        label: ClassLabel,
    },
    /// The sole landmark has no reference point, so nothing could pass.
    #[error("single-landmark mode requires a reference point for landmark {label}")]
    SingleLandmarkUnlocated {
        /// Landmark without a reference point.
        label: ClassLabel,
    },
    /// The acceptance threshold is outside `0.0..=1.0`.
    #[error("acceptance threshold must be within [0, 1], got {threshold}")]
    InvalidThreshold {
        /// Rejected threshold.
        threshold: f32,
    },
}

/// Fuses classifier output and geodesic distance into verdicts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use landmark_core::{
///     ClassLabel, GeoCoordinate, LandmarkEntry, LandmarkRegistry, Outcome,
///     VerificationEngine, VerificationMode,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let reference = GeoCoordinate::new(17.020610, -96.721033)?;
/// let registry = LandmarkRegistry::builder()
///     .landmark(LandmarkEntry::new(ClassLabel::new(1), "Lugar 1", reference, 25.0))
///     .build()?;
/// let engine = VerificationEngine::new(Arc::new(registry), VerificationMode::MultiLandmark)?;
///
/// let classification = engine.interpret(vec![0.05, 0.92, 0.03])?;
/// let verdict = engine.verify(&classification, reference);
/// assert_eq!(verdict.state_code(), 2);
/// assert_eq!(verdict.outcome(), Outcome::Accepted);
/// assert_eq!(verdict.distance_meters(), Some(0.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    registry: Arc<LandmarkRegistry>,
    mode: VerificationMode,
}

impl VerificationEngine {
    /// Build an engine over a shared registry.
    ///
    /// # Errors
    /// Returns [`EngineConfigError`] when single-landmark mode is paired with
    /// a registry that does not hold exactly one located landmark or that
    /// configures an unknown-class label, or when its threshold is outside
    /// `0.0..=1.0`.
    pub fn new(
        registry: Arc<LandmarkRegistry>,
        mode: VerificationMode,
    ) -> Result<Self, EngineConfigError> {
        if let VerificationMode::SingleLandmark {
            acceptance_threshold,
        } = mode
        {
            if !(0.0..=1.0).contains(&acceptance_threshold) {
                return Err(EngineConfigError::InvalidThreshold {
                    threshold: acceptance_threshold,
                });
            }
            if registry.len() != 1 {
                return Err(EngineConfigError::SingleLandmarkCount {
                    found: registry.len(),
                });
            }
            if let Some(label) = registry.unknown().label {
                return Err(EngineConfigError::UnknownLabelInSingleMode { label });
            }
            if let Some(entry) = registry.iter().find(|entry| entry.reference.is_none()) {
                return Err(EngineConfigError::SingleLandmarkUnlocated { label: entry.label });
            }
        }
        Ok(Self { registry, mode })
    }

    /// Registry the engine reads reference data from.
    #[must_use]
    pub fn registry(&self) -> &LandmarkRegistry {
        &self.registry
    }

    /// Configured mode.
    #[must_use]
    pub const fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Interpret a raw classifier distribution according to the mode.
    ///
    /// In single-landmark mode the result is attributed to the sole
    /// landmark; whether the photo matches is decided by
    /// [`VerificationEngine::check_image`].
    ///
    /// # Errors
    /// Propagates [`ClassificationError`] for empty or non-finite
    /// distributions, and in single-landmark mode for any output that is not
    /// exactly one score.
    pub fn interpret(
        &self,
        distribution: Vec<f32>,
    ) -> Result<ClassificationResult, ClassificationError> {
        match (self.mode, self.registry.iter().next()) {
            (VerificationMode::SingleLandmark { .. }, Some(entry)) => {
                ClassificationResult::for_label(entry.label, distribution)
            }
            _ => ClassificationResult::from_distribution(distribution),
        }
    }

    /// Whether the photo shows a registered landmark.
    #[must_use]
    pub fn check_image(&self, classification: &ClassificationResult) -> bool {
        let registered = self
            .registry
            .lookup(classification.predicted_label())
            .is_some();
        match self.mode {
            VerificationMode::MultiLandmark => registered,
            VerificationMode::SingleLandmark {
                acceptance_threshold,
            } => registered && classification.confidence() > acceptance_threshold,
        }
    }

    /// Measure `coordinate` against the reference point of `label`.
    ///
    /// Labels without a reference coordinate never pass and carry no
    /// distance.
    #[must_use]
    pub fn check_location(&self, label: ClassLabel, coordinate: GeoCoordinate) -> LocationCheck {
        let Some(reference) = self.registry.lookup(label).and_then(|entry| entry.reference) else {
            return LocationCheck::UNAVAILABLE;
        };
        let distance = reference.coordinate.distance_to(coordinate);
        LocationCheck {
            distance_meters: Some(distance),
            within_radius: distance <= reference.radius_meters,
        }
    }

    /// Fuse the image and location checks into a verdict.
    #[must_use]
    pub fn verify(
        &self,
        classification: &ClassificationResult,
        coordinate: GeoCoordinate,
    ) -> VerificationVerdict {
        let label = classification.predicted_label();
        let image_valid = self.check_image(classification);
        let location = self.check_location(label, coordinate);
        let state = VerificationState::from_checks(image_valid, location.within_radius);
        log::debug!(
            "label {label} at {coordinate}: image_valid={image_valid} location_valid={} state={}",
            location.within_radius,
            state.code()
        );
        VerificationVerdict {
            detected_label: label,
            detected_name: self.registry.display_name(label).to_owned(),
            confidence: classification.confidence(),
            distance_meters: location.distance_meters,
            state,
        }
    }

    /// Describe what the photo shows, without any location logic.
    ///
    /// Photos that fail [`VerificationEngine::check_image`] are reported with
    /// the unknown-class metadata.
    #[must_use]
    pub fn identify(&self, classification: &ClassificationResult) -> Identification {
        let label = classification.predicted_label();
        let confidence = classification.confidence();
        match self.registry.lookup(label) {
            Some(entry) if self.check_image(classification) => Identification {
                label,
                recognised: true,
                display_name: entry.display_name.clone(),
                description: entry.description.clone(),
                media_link: entry.media_link.clone(),
                confidence,
            },
            _ => {
                let unknown = self.registry.unknown();
                Identification {
                    label,
                    recognised: false,
                    display_name: unknown.display_name.clone(),
                    description: Some(unknown.description.clone()),
                    media_link: None,
                    confidence,
                }
            }
        }
    }
}
