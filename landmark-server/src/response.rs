//! JSON bodies returned by the service.
//!
//! Confidence and distance are rounded here, at the response boundary; the
//! engine compares unrounded values.

use landmark_core::{ClassLabel, Identification, Outcome, VerificationVerdict};
use serde::{Deserialize, Serialize};

/// Full verdict returned in multi-landmark mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictBody {
    /// Label the classifier detected.
    pub detected_label: ClassLabel,
    /// Display name of the detected label.
    pub detected_name: String,
    /// `"Aceptado"` or `"Rechazado"`.
    pub outcome: Outcome,
    /// Confidence rounded to three decimals.
    pub confidence: f64,
    /// Distance in metres rounded to two decimals, `null` for unknown labels.
    pub distance_meters: Option<f64>,
    /// State code: `2`, `1`, `0` or `-1`.
    pub state_code: i8,
    /// Human-readable state message.
    pub message: String,
}

impl From<&VerificationVerdict> for VerdictBody {
    fn from(verdict: &VerificationVerdict) -> Self {
        Self {
            detected_label: verdict.detected_label(),
            detected_name: verdict.detected_name().to_owned(),
            outcome: verdict.outcome(),
            confidence: verdict.rounded_confidence(),
            distance_meters: verdict.rounded_distance(),
            state_code: verdict.state_code(),
            message: verdict.message().to_owned(),
        }
    }
}

/// Verdict subset returned in single-landmark mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedVerdictBody {
    /// Display name of the landmark.
    pub detected_name: String,
    /// `"Aceptado"` or `"Rechazado"`.
    pub outcome: Outcome,
    /// Score rounded to three decimals.
    pub confidence: f64,
    /// Distance in metres rounded to two decimals.
    pub distance_meters: Option<f64>,
}

impl From<&VerificationVerdict> for ReducedVerdictBody {
    fn from(verdict: &VerificationVerdict) -> Self {
        Self {
            detected_name: verdict.detected_name().to_owned(),
            outcome: verdict.outcome(),
            confidence: verdict.rounded_confidence(),
            distance_meters: verdict.rounded_distance(),
        }
    }
}

/// Result of `/classify-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationBody {
    /// Detected label.
    pub label: ClassLabel,
    /// Whether the label is a registered landmark.
    pub recognised: bool,
    /// Landmark or unknown-class name.
    pub name: String,
    /// Landmark or unknown-class description.
    pub description: Option<String>,
    /// Related media, when the landmark has one.
    pub media_link: Option<String>,
    /// Confidence rounded to three decimals.
    pub confidence: f64,
}

impl From<Identification> for IdentificationBody {
    fn from(identification: Identification) -> Self {
        let confidence = identification.rounded_confidence();
        Self {
            label: identification.label,
            recognised: identification.recognised,
            name: identification.display_name,
            description: identification.description,
            media_link: identification.media_link,
            confidence,
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    /// Always `"ok"`.
    pub status: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Description of what went wrong.
    pub error: String,
}
