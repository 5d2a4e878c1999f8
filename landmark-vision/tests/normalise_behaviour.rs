#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests for turning uploads into classifier input.

use std::cell::RefCell;

use landmark_core::ImageTensor;
use landmark_vision::test_support::encode_png;
use landmark_vision::{ImageDecodeError, ImageNormaliser};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Scenario state shared between steps.
#[derive(Debug, Default)]
struct NormaliseWorld {
    normaliser: RefCell<Option<ImageNormaliser>>,
    result: RefCell<Option<Result<ImageTensor, ImageDecodeError>>>,
}

impl NormaliseWorld {
    fn normalise(&self, bytes: &[u8]) {
        let normaliser = self
            .normaliser
            .borrow()
            .expect("normaliser should be configured");
        self.result.replace(Some(normaliser.normalise(bytes)));
    }
}

#[fixture]
fn world() -> NormaliseWorld {
    NormaliseWorld::default()
}

#[given("a normaliser targeting {width:u32} by {height:u32} pixels")]
fn given_normaliser(world: &NormaliseWorld, width: u32, height: u32) {
    world.normaliser.replace(Some(
        ImageNormaliser::new(width, height).expect("non-zero target"),
    ));
}

#[when("a {width:u32} by {height:u32} PNG is normalised")]
fn when_png_normalised(world: &NormaliseWorld, width: u32, height: u32) {
    let png = encode_png(width, height, [90, 120, 200]).expect("encode png");
    world.normalise(&png);
}

#[when("the first {count:usize} bytes of a PNG are normalised")]
fn when_truncated_png_normalised(world: &NormaliseWorld, count: usize) {
    let png = encode_png(64, 64, [90, 120, 200]).expect("encode png");
    world.normalise(png.get(..count).expect("png longer than prefix"));
}

#[then("the tensor shape is {batch:usize} by {height:usize} by {width:usize} by {channels:usize}")]
fn then_shape(world: &NormaliseWorld, batch: usize, height: usize, width: usize, channels: usize) {
    let result = world.result.borrow();
    let tensor = result
        .as_ref()
        .expect("normalisation should have run")
        .as_ref()
        .expect("normalisation should succeed");
    assert_eq!(tensor.shape(), [batch, height, width, channels]);
}

#[then("every value lies between 0 and 1")]
fn then_unit_range(world: &NormaliseWorld) {
    let result = world.result.borrow();
    let tensor = result
        .as_ref()
        .expect("normalisation should have run")
        .as_ref()
        .expect("normalisation should succeed");
    assert!(tensor.as_array().iter().all(|value| (0.0..=1.0).contains(value)));
}

#[then("normalisation fails with a decode error")]
fn then_decode_error(world: &NormaliseWorld) {
    let result = world.result.borrow();
    let outcome = result.as_ref().expect("normalisation should have run");
    assert!(matches!(outcome, Err(ImageDecodeError::Decode { .. })));
}

#[scenario(path = "tests/features/normalise.feature", index = 0)]
fn landscape_photo_is_resized(world: NormaliseWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/normalise.feature", index = 1)]
fn truncated_upload_is_rejected(world: NormaliseWorld) {
    let _ = world;
}
