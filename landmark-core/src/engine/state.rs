//! The four verification states and the accept/reject outcome.

use std::fmt;

/// Final accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Both the photo and the coordinates matched.
    #[cfg_attr(feature = "serde", serde(rename = "Aceptado"))]
    Accepted,
    /// At least one check failed.
    #[cfg_attr(feature = "serde", serde(rename = "Rechazado"))]
    Rejected,
}

impl Outcome {
    /// Label reported to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "Aceptado",
            Self::Rejected => "Rechazado",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic state of a verification, derived from the image and location
/// checks.
///
/// | image | location | state            | code |
/// |-------|----------|------------------|------|
/// | yes   | yes      | `Verified`       | 2    |
/// | no    | yes      | `LocationOnly`   | 1    |
/// | yes   | no       | `ImageOnly`      | 0    |
/// | no    | no       | `Unverified`     | -1   |
///
/// Only [`VerificationState::Verified`] is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationState {
    /// Photo and coordinates both match the landmark.
    Verified,
    /// Coordinates match but the photo does not.
    LocationOnly,
    /// Photo matches but the coordinates do not.
    ImageOnly,
    /// Neither matches.
    Unverified,
}

impl VerificationState {
    /// Every state, in descending code order.
    pub const ALL: [Self; 4] = [
        Self::Verified,
        Self::LocationOnly,
        Self::ImageOnly,
        Self::Unverified,
    ];

    /// Derive the state from the two independent checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use landmark_core::{Outcome, VerificationState};
    ///
    /// let state = VerificationState::from_checks(true, false);
    /// assert_eq!(state.code(), 0);
    /// assert_eq!(state.outcome(), Outcome::Rejected);
    /// ```
    #[must_use]
    pub const fn from_checks(image_valid: bool, location_valid: bool) -> Self {
        match (image_valid, location_valid) {
            (true, true) => Self::Verified,
            (false, true) => Self::LocationOnly,
            (true, false) => Self::ImageOnly,
            (false, false) => Self::Unverified,
        }
    }

    /// Stable numeric code reported to clients.
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Verified => 2,
            Self::LocationOnly => 1,
            Self::ImageOnly => 0,
            Self::Unverified => -1,
        }
    }

    /// State for a numeric code, if it is one of the four defined codes.
    #[must_use]
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            2 => Some(Self::Verified),
            1 => Some(Self::LocationOnly),
            0 => Some(Self::ImageOnly),
            -1 => Some(Self::Unverified),
            _ => None,
        }
    }

    /// Human-readable message reported to clients.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Verified => "Foto y coordenadas correctas",
            Self::LocationOnly => "Coordenadas correctas, pero la foto no coincide",
            Self::ImageOnly => "Foto correcta, pero las coordenadas no coinciden",
            Self::Unverified => "Foto y coordenadas incorrectas",
        }
    }

    /// Accept only when both checks passed.
    #[must_use]
    pub const fn outcome(self) -> Outcome {
        match self {
            Self::Verified => Outcome::Accepted,
            Self::LocationOnly | Self::ImageOnly | Self::Unverified => Outcome::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true, 2, Outcome::Accepted, "Foto y coordenadas correctas")]
    #[case(
        false,
        true,
        1,
        Outcome::Rejected,
        "Coordenadas correctas, pero la foto no coincide"
    )]
    #[case(
        true,
        false,
        0,
        Outcome::Rejected,
        "Foto correcta, pero las coordenadas no coinciden"
    )]
    #[case(false, false, -1, Outcome::Rejected, "Foto y coordenadas incorrectas")]
    fn decision_table(
        #[case] image_valid: bool,
        #[case] location_valid: bool,
        #[case] code: i8,
        #[case] outcome: Outcome,
        #[case] message: &str,
    ) {
        let state = VerificationState::from_checks(image_valid, location_valid);
        assert_eq!(state.code(), code);
        assert_eq!(state.outcome(), outcome);
        assert_eq!(state.message(), message);
    }

    #[rstest]
    fn codes_round_trip_and_nothing_else_decodes() {
        for state in VerificationState::ALL {
            assert_eq!(VerificationState::from_code(state.code()), Some(state));
        }
        assert_eq!(VerificationState::from_code(3), None);
        assert_eq!(VerificationState::from_code(-2), None);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn outcome_serialises_as_spanish_label() {
        let json = serde_json::to_string(&Outcome::Accepted).expect("serialise");
        assert_eq!(json, "\"Aceptado\"");
        assert_eq!(Outcome::Rejected.to_string(), "Rechazado");
    }
}
