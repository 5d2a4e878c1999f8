//! Classifier input tensor.

use ndarray::Array4;
use thiserror::Error;

/// Number of colour channels the classifier expects.
pub const CHANNELS: usize = 3;

/// Error returned when an array does not have the classifier input layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a tensor of shape [1, height, width, {CHANNELS}], found {found:?}")]
pub struct TensorShapeError {
    /// Shape of the rejected array.
    pub found: [usize; 4],
}

/// A single RGB image laid out as `[batch = 1, height, width, channel]`
/// with values in `0.0..=1.0`.
///
/// Each request owns its tensor; nothing about it is shared between
/// requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// Wrap an NHWC array holding exactly one RGB image.
    ///
    /// # Errors
    /// Returns [`TensorShapeError`] when the batch size is not one, the
    /// channel count is not three, or a spatial dimension is zero.
    pub fn from_array(data: Array4<f32>) -> Result<Self, TensorShapeError> {
        let (batch, height, width, channels) = data.dim();
        if batch != 1 || channels != CHANNELS || height == 0 || width == 0 {
            return Err(TensorShapeError {
                found: [batch, height, width, channels],
            });
        }
        Ok(Self { data })
    }

    /// A black image of the given size, mostly useful in tests.
    #[must_use]
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            data: Array4::zeros((1, height.max(1), width.max(1), CHANNELS)),
        }
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    /// Full `[1, height, width, 3]` shape.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        let (batch, height, width, channels) = self.data.dim();
        [batch, height, width, channels]
    }

    /// Borrow the underlying array.
    #[must_use]
    pub const fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Contiguous row-major view of the values, when the layout allows it.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }

    /// Consume the tensor and return the underlying array.
    #[must_use]
    pub fn into_array(self) -> Array4<f32> {
        self.data
    }
}
