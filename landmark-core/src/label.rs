//! Classifier class labels.

use std::fmt;

/// Identifier of one classifier output class.
///
/// In multi-landmark deployments a label is the position of its probability
/// in the classifier's output distribution.
///
/// # Examples
///
/// ```
/// use landmark_core::ClassLabel;
///
/// let label = ClassLabel::new(2);
/// assert_eq!(label.get(), 2);
/// assert_eq!(ClassLabel::from_index(2), Some(label));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ClassLabel(u32);

impl ClassLabel {
    /// Wrap a raw class identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw class identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Label for the distribution slot at `index`, if it fits in `u32`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Distribution slot for this label.
    #[must_use]
    pub fn index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl From<u32> for ClassLabel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
