//! Decoding uploaded photos into classifier input tensors.

use image::imageops::{self, FilterType};
use landmark_core::ImageTensor;
use landmark_core::tensor::CHANNELS;
use ndarray::Array4;
use thiserror::Error;

/// Side length, in pixels, of the square input most landmark models expect.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Error returned when a normaliser is configured with an empty target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("target image size must be non-zero, got {width}x{height}")]
pub struct TargetSizeError {
    /// Requested width.
    pub width: u32,
    /// Requested height.
    pub height: u32,
}

/// Errors raised while turning uploaded bytes into a tensor.
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    /// The upload contained no bytes.
    #[error("image payload is empty")]
    EmptyInput,
    /// The bytes are not an image in a supported format.
    #[error("failed to decode image: {source}")]
    Decode {
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
    /// The resized pixels could not be arranged into a tensor.
    #[error("failed to build input tensor: {reason}")]
    Layout {
        /// Description of the layout failure.
        reason: String,
    },
}

/// Resizes and rescales photos to the classifier's input layout.
///
/// Every photo is converted to RGB, resized to exactly `width × height` with
/// nearest-neighbour sampling (aspect ratio is not preserved), scaled to
/// `0.0..=1.0` and given a leading batch axis.
///
/// # Examples
///
/// ```
/// use landmark_vision::ImageNormaliser;
///
/// let normaliser = ImageNormaliser::new(224, 224).expect("non-zero size");
/// assert!(normaliser.normalise(&[]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNormaliser {
    width: u32,
    height: u32,
}

impl Default for ImageNormaliser {
    fn default() -> Self {
        Self {
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
        }
    }
}

impl ImageNormaliser {
    /// Create a normaliser producing `width × height` tensors.
    ///
    /// # Errors
    /// Returns [`TargetSizeError`] when either dimension is zero.
    pub const fn new(width: u32, height: u32) -> Result<Self, TargetSizeError> {
        if width == 0 || height == 0 {
            return Err(TargetSizeError { width, height });
        }
        Ok(Self { width, height })
    }

    /// Target width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Decode `bytes` and lay the pixels out as an NHWC tensor.
    ///
    /// The format is sniffed from the content, so any format the `image`
    /// crate decodes by default is accepted.
    ///
    /// # Errors
    /// Returns [`ImageDecodeError`] when the payload is empty or is not a
    /// decodable image.
    pub fn normalise(&self, bytes: &[u8]) -> Result<ImageTensor, ImageDecodeError> {
        if bytes.is_empty() {
            return Err(ImageDecodeError::EmptyInput);
        }
        let decoded =
            image::load_from_memory(bytes).map_err(|source| ImageDecodeError::Decode { source })?;
        log::debug!(
            "decoded {}x{} image, resizing to {}x{}",
            decoded.width(),
            decoded.height(),
            self.width,
            self.height
        );
        let rgb = decoded.to_rgb8();
        let resized = imageops::resize(&rgb, self.width, self.height, FilterType::Nearest);

        let height = usize::try_from(self.height).map_err(|err| layout_error(&err))?;
        let width = usize::try_from(self.width).map_err(|err| layout_error(&err))?;
        let pixels = resized.into_raw().into_iter().map(rescale).collect();
        let array = Array4::from_shape_vec((1, height, width, CHANNELS), pixels)
            .map_err(|err| layout_error(&err))?;
        ImageTensor::from_array(array).map_err(|err| layout_error(&err))
    }
}

#[expect(clippy::float_arithmetic, reason = "maps 8-bit samples onto 0.0..=1.0")]
fn rescale(value: u8) -> f32 {
    f32::from(value) / 255.0
}

fn layout_error(err: &dyn std::error::Error) -> ImageDecodeError {
    ImageDecodeError::Layout {
        reason: err.to_string(),
    }
}
