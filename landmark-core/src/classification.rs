//! Classifier seam and its interpreted output.
//!
//! The image classifier itself is opaque: anything implementing
//! [`PlaceClassifier`] that maps an [`ImageTensor`] to a probability
//! distribution can back the verifier. [`ClassificationResult`] is the
//! immutable, per-request interpretation of that distribution.

use thiserror::Error;

use crate::{ClassLabel, ImageTensor};

/// Errors raised while interpreting a probability distribution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// The classifier returned no probabilities.
    #[error("classifier returned an empty distribution")]
    EmptyDistribution,
    /// A probability was NaN or infinite.
    #[error("probability at index {index} is not finite")]
    NonFiniteProbability {
        /// Position of the offending probability.
        index: usize,
    },
    /// A single-score model returned more or fewer than one value.
    #[error("single-landmark classifier must return exactly one score, got {found}")]
    ExpectedSingleScore {
        /// Number of values returned.
        found: usize,
    },
    /// The distribution is too long to be addressed by [`ClassLabel`].
    #[error("distribution slot {index} cannot be represented as a class label")]
    LabelOutOfRange {
        /// Position of the winning probability.
        index: usize,
    },
}

/// Errors raised by a [`PlaceClassifier`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// The tensor does not match the input the model was built for.
    #[error("classifier expects input shape {expected:?}, got {found:?}")]
    ShapeMismatch {
        /// Shape the model was loaded with.
        expected: [usize; 4],
        /// Shape of the supplied tensor.
        found: [usize; 4],
    },
    /// Running the model failed.
    #[error("classifier inference failed: {reason}")]
    Inference {
        /// Rendered error reported by the inference runtime.
        reason: String,
    },
}

/// Score an image against the fixed label set of a deployment.
///
/// The call is synchronous and may be expensive. Implementations are shared
/// between concurrent requests, so they must be `Send + Sync` and must not
/// keep per-request state.
///
/// # Examples
///
/// ```
/// use landmark_core::{ClassifierError, ImageTensor, PlaceClassifier};
///
/// struct AlwaysFirst;
///
/// impl PlaceClassifier for AlwaysFirst {
///     fn input_size(&self) -> (u32, u32) {
///         (224, 224)
///     }
///
///     fn classify(&self, _input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
///         Ok(vec![0.9, 0.1])
///     }
/// }
///
/// let scores = AlwaysFirst.classify(&ImageTensor::zeros(224, 224))?;
/// assert_eq!(scores.len(), 2);
/// # Ok::<(), ClassifierError>(())
/// ```
pub trait PlaceClassifier: Send + Sync {
    /// Spatial input size as `(width, height)` in pixels.
    fn input_size(&self) -> (u32, u32);

    /// Return one probability per label, indexed by [`ClassLabel::index`].
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError>;
}

/// Interpreted classifier output for one request.
///
/// `confidence` is always the maximum of `distribution`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    predicted_label: ClassLabel,
    confidence: f32,
    distribution: Vec<f32>,
}

impl ClassificationResult {
    /// Pick the most probable label from `distribution`.
    ///
    /// Ties resolve to the lowest index.
    ///
    /// # Errors
    /// Rejects empty distributions and non-finite probabilities.
    ///
    /// # Examples
    ///
    /// ```
    /// use landmark_core::{ClassLabel, ClassificationResult};
    ///
    /// let result = ClassificationResult::from_distribution(vec![0.05, 0.92, 0.03])?;
    /// assert_eq!(result.predicted_label(), ClassLabel::new(1));
    /// assert_eq!(result.confidence(), 0.92);
    /// # Ok::<(), landmark_core::ClassificationError>(())
    /// ```
    pub fn from_distribution(distribution: Vec<f32>) -> Result<Self, ClassificationError> {
        let (index, confidence) = argmax(&distribution)?;
        let predicted_label =
            ClassLabel::from_index(index).ok_or(ClassificationError::LabelOutOfRange { index })?;
        Ok(Self {
            predicted_label,
            confidence,
            distribution,
        })
    }

    /// Attribute a single score to a fixed label, as single-landmark models
    /// emit one score for their only class.
    ///
    /// # Errors
    /// Returns [`ClassificationError::ExpectedSingleScore`] unless
    /// `distribution` holds exactly one value, and rejects a non-finite
    /// score.
    pub fn for_label(
        label: ClassLabel,
        distribution: Vec<f32>,
    ) -> Result<Self, ClassificationError> {
        if distribution.len() != 1 {
            return Err(ClassificationError::ExpectedSingleScore {
                found: distribution.len(),
            });
        }
        let (_, confidence) = argmax(&distribution)?;
        Ok(Self {
            predicted_label: label,
            confidence,
            distribution,
        })
    }

    /// Label the classifier settled on.
    #[must_use]
    pub const fn predicted_label(&self) -> ClassLabel {
        self.predicted_label
    }

    /// Highest probability in the distribution.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Full per-label distribution as returned by the classifier.
    #[must_use]
    pub fn distribution(&self) -> &[f32] {
        &self.distribution
    }
}

fn argmax(distribution: &[f32]) -> Result<(usize, f32), ClassificationError> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &probability) in distribution.iter().enumerate() {
        if !probability.is_finite() {
            return Err(ClassificationError::NonFiniteProbability { index });
        }
        match best {
            Some((_, current)) if probability <= current => {}
            _ => best = Some((index, probability)),
        }
    }
    best.ok_or(ClassificationError::EmptyDistribution)
}
