//! Engine outputs.

use super::state::{Outcome, VerificationState};
use crate::ClassLabel;

/// Decimal places of confidence values reported to clients.
pub const CONFIDENCE_DECIMALS: i32 = 3;

/// Decimal places of distances reported to clients.
pub const DISTANCE_DECIMALS: i32 = 2;

/// Result of checking a coordinate against a label's reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationCheck {
    /// Geodesic distance to the reference coordinate, absent when the label
    /// has none.
    pub distance_meters: Option<f64>,
    /// Whether the distance is within the landmark's radius tolerance.
    pub within_radius: bool,
}

impl LocationCheck {
    /// Check outcome for a label with no reference coordinate.
    pub const UNAVAILABLE: Self = Self {
        distance_meters: None,
        within_radius: false,
    };
}

/// Fused verdict for one verification request.
///
/// Values are stored unrounded; use [`VerificationVerdict::rounded_confidence`]
/// and [`VerificationVerdict::rounded_distance`] when reporting them.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationVerdict {
    pub(super) detected_label: ClassLabel,
    pub(super) detected_name: String,
    pub(super) confidence: f32,
    pub(super) distance_meters: Option<f64>,
    pub(super) state: VerificationState,
}

impl VerificationVerdict {
    /// Label the classifier detected.
    #[must_use]
    pub const fn detected_label(&self) -> ClassLabel {
        self.detected_label
    }

    /// Display name of the detected label.
    #[must_use]
    pub fn detected_name(&self) -> &str {
        &self.detected_name
    }

    /// Unrounded classifier confidence.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Unrounded distance to the detected landmark, absent when the label has
    /// no reference coordinate.
    #[must_use]
    pub const fn distance_meters(&self) -> Option<f64> {
        self.distance_meters
    }

    /// Diagnostic state.
    #[must_use]
    pub const fn state(&self) -> VerificationState {
        self.state
    }

    /// Numeric state code (`-1`, `0`, `1` or `2`).
    #[must_use]
    pub const fn state_code(&self) -> i8 {
        self.state.code()
    }

    /// Human-readable message for the state.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.state.message()
    }

    /// Accepted only when the state is [`VerificationState::Verified`].
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    /// Confidence rounded to three decimal places.
    #[must_use]
    pub fn rounded_confidence(&self) -> f64 {
        round_to(f64::from(self.confidence), CONFIDENCE_DECIMALS)
    }

    /// Distance rounded to two decimal places.
    #[must_use]
    pub fn rounded_distance(&self) -> Option<f64> {
        self.distance_meters
            .map(|distance| round_to(distance, DISTANCE_DECIMALS))
    }
}

/// What the classifier recognised in a photo, without any location logic.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Detected label.
    pub label: ClassLabel,
    /// Whether the label is a registered landmark.
    pub recognised: bool,
    /// Landmark name, or the unknown-class name.
    pub display_name: String,
    /// Landmark description, or the unknown-class description.
    pub description: Option<String>,
    /// Related media for the landmark.
    pub media_link: Option<String>,
    /// Unrounded classifier confidence.
    pub confidence: f32,
}

impl Identification {
    /// Confidence rounded to three decimal places.
    #[must_use]
    pub fn rounded_confidence(&self) -> f64 {
        round_to(f64::from(self.confidence), CONFIDENCE_DECIMALS)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "rounding scales by a power of ten and back"
)]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
