//! Helpers for building photo uploads in tests.

use std::io::Cursor;

use image::{ImageFormat, ImageResult, Rgb, RgbImage};

/// Encode a solid-colour `width × height` PNG.
///
/// # Errors
/// Propagates encoder failures from the `image` crate.
pub fn encode_png(width: u32, height: u32, colour: [u8; 3]) -> ImageResult<Vec<u8>> {
    let image = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
