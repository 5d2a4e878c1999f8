//! Status mapping for request-scoped errors.

use super::*;
use axum::http::StatusCode;
use landmark_core::{ClassifierError, GeoCoordinate};
use landmark_vision::ImageDecodeError;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case(ApiError::MissingField { field: "lat" }, StatusCode::BAD_REQUEST)]
#[case(ApiError::EmptyFilename { field: "image" }, StatusCode::BAD_REQUEST)]
#[case(ApiError::ImageDecode(ImageDecodeError::EmptyInput), StatusCode::BAD_REQUEST)]
#[case(
    ApiError::ClassificationTimeout { timeout: Duration::from_millis(50) },
    StatusCode::REQUEST_TIMEOUT
)]
#[case(
    ApiError::Classifier(ClassifierError::Inference { reason: "boom".to_owned() }),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[case(
    ApiError::Multipart { status: StatusCode::PAYLOAD_TOO_LARGE, reason: "too big".to_owned() },
    StatusCode::PAYLOAD_TOO_LARGE
)]
fn errors_map_to_statuses(#[case] error: ApiError, #[case] expected: StatusCode) {
    assert_eq!(error.status(), expected);
}

#[rstest]
#[case("abc", "0")]
#[case("95", "0")]
fn coordinate_errors_are_client_errors(#[case] lat: &str, #[case] lon: &str) {
    let err = GeoCoordinate::parse(lat, lon).expect_err("invalid coordinate");
    let api = ApiError::from(err);
    assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    assert!(api.to_string().contains("lat"), "message: {api}");
}

#[rstest]
fn missing_field_message_names_the_field() {
    let message = ApiError::MissingField { field: "lon" }.to_string();
    assert_eq!(message, "missing required field `lon`");
}
