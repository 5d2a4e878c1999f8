#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests for fusing classification and location checks.

use std::cell::RefCell;
use std::sync::Arc;

use landmark_core::test_support::{
    FIRST_REFERENCE, FixedClassifier, coordinate, demo_registry, single_landmark_registry,
};
use landmark_core::{
    ClassLabel, GeoCoordinate, ImageTensor, LandmarkRegistry, PlaceClassifier, VerificationEngine,
    VerificationMode, VerificationVerdict,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Scenario state shared between steps.
#[derive(Debug, Default)]
struct VerificationWorld {
    registry: RefCell<Option<LandmarkRegistry>>,
    mode: RefCell<Option<VerificationMode>>,
    classifier: RefCell<Option<FixedClassifier>>,
    verdict: RefCell<Option<VerificationVerdict>>,
}

impl VerificationWorld {
    fn verify_at(&self, submitted: GeoCoordinate) {
        let registry = self.registry.take().expect("registry should be configured");
        let mode = self
            .mode
            .borrow()
            .expect("verification mode should be configured");
        let engine = VerificationEngine::new(Arc::new(registry), mode).expect("valid engine");
        let guard = self.classifier.borrow();
        let classifier = guard.as_ref().expect("classifier should be configured");

        let (width, height) = classifier.input_size();
        let tensor = ImageTensor::zeros(height as usize, width as usize);
        let distribution = classifier.classify(&tensor).expect("classification");
        let classification = engine.interpret(distribution).expect("valid distribution");
        self.verdict
            .replace(Some(engine.verify(&classification, submitted)));
    }

    fn with_verdict<T>(&self, check: impl FnOnce(&VerificationVerdict) -> T) -> T {
        let verdict = self.verdict.borrow();
        check(verdict.as_ref().expect("verdict should be recorded"))
    }
}

#[fixture]
fn world() -> VerificationWorld {
    VerificationWorld::default()
}

#[given("the demo registry with a radius of {radius:f64} metres")]
fn given_demo_registry(world: &VerificationWorld, radius: f64) {
    world
        .registry
        .replace(Some(demo_registry(radius).expect("demo registry")));
    world.mode.replace(Some(VerificationMode::MultiLandmark));
}

#[given("the single landmark registry with a radius of {radius:f64} metres")]
fn given_single_registry(world: &VerificationWorld, radius: f64) {
    world.registry.replace(Some(
        single_landmark_registry(radius).expect("single landmark registry"),
    ));
    world.mode.replace(Some(VerificationMode::single()));
}

#[given("a classifier favouring label {label:u32} with confidence {confidence:f32}")]
fn given_favouring_classifier(world: &VerificationWorld, label: u32, confidence: f32) {
    world.classifier.replace(Some(FixedClassifier::favouring(
        ClassLabel::new(label),
        confidence,
        3,
    )));
}

#[given("a single landmark classifier scoring {score:f32}")]
fn given_scoring_classifier(world: &VerificationWorld, score: f32) {
    world
        .classifier
        .replace(Some(FixedClassifier::new(vec![score])));
}

#[when("the photo is verified at the first reference point")]
fn when_verified_at_reference(world: &VerificationWorld) {
    world.verify_at(coordinate(FIRST_REFERENCE));
}

#[when("the photo is verified fifty metres north of the first reference point")]
fn when_verified_fifty_metres_north(world: &VerificationWorld) {
    let (latitude, longitude) = FIRST_REFERENCE;
    world.verify_at(coordinate((latitude + 0.000_452, longitude)));
}

#[then("the state code is {code:i8}")]
fn then_state_code(world: &VerificationWorld, code: i8) {
    world.with_verdict(|verdict| assert_eq!(verdict.state_code(), code));
}

#[then("the outcome is {outcome:word}")]
fn then_outcome(world: &VerificationWorld, outcome: String) {
    world.with_verdict(|verdict| assert_eq!(verdict.outcome().as_str(), outcome));
}

#[then("the distance is 0 metres")]
fn then_zero_distance(world: &VerificationWorld) {
    world.with_verdict(|verdict| assert_eq!(verdict.distance_meters(), Some(0.0)));
}

#[then("the distance is about {expected:f64} metres")]
fn then_distance_about(world: &VerificationWorld, expected: f64) {
    world.with_verdict(|verdict| {
        let distance = verdict.distance_meters().expect("distance should be reported");
        assert!(
            (distance - expected).abs() < 0.5,
            "distance {distance} is not close to {expected}"
        );
    });
}

#[then("no distance is reported")]
fn then_no_distance(world: &VerificationWorld) {
    world.with_verdict(|verdict| assert_eq!(verdict.distance_meters(), None));
}

#[scenario(path = "tests/features/verification.feature", index = 0)]
fn matching_photo_at_landmark(world: VerificationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verification.feature", index = 1)]
fn matching_photo_too_far_away(world: VerificationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verification.feature", index = 2)]
fn unknown_photo(world: VerificationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verification.feature", index = 3)]
fn single_landmark_threshold(world: VerificationWorld) {
    let _ = world;
}
