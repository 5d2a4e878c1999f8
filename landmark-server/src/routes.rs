//! HTTP routes.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use landmark_core::{GeoCoordinate, VerificationMode};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::response::{HealthBody, IdentificationBody, ReducedVerdictBody, VerdictBody};
use crate::state::AppState;

const FIELD_IMAGE: &str = "image";
const FIELD_IMAGE_LEGACY: &str = "imagen";
const FIELD_LAT: &str = "lat";
const FIELD_LON: &str = "lon";

/// Build the service router.
///
/// CORS is open to every origin. Request bodies above the configured upload
/// limit are rejected before they reach a handler.
pub fn router(state: AppState) -> Router {
    let body_limit = state.limits().max_upload_bytes;
    Router::new()
        .route("/verify-place", post(verify_place))
        .route("/classify-image", post(classify_image))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Multipart fields of an upload, as received.
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<ImagePart>,
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Debug)]
struct ImagePart {
    file_name: Option<String>,
    bytes: Bytes,
}

impl UploadForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart.map_err(|rejection| ApiError::Multipart {
            status: rejection.status(),
            reason: rejection.body_text(),
        })?;
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(FIELD_IMAGE | FIELD_IMAGE_LEGACY) => {
                    let file_name = field.file_name().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.image = Some(ImagePart { file_name, bytes });
                }
                Some(FIELD_LAT) => form.lat = Some(field.text().await.map_err(multipart_error)?),
                Some(FIELD_LON) => form.lon = Some(field.text().await.map_err(multipart_error)?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// The uploaded image, provided it arrived as a named file.
    fn take_image(&mut self) -> Result<Bytes, ApiError> {
        let part = self.image.take().ok_or(ApiError::MissingField { field: FIELD_IMAGE })?;
        match part.file_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(part.bytes),
            _ => Err(ApiError::EmptyFilename { field: FIELD_IMAGE }),
        }
    }

    fn coordinate(&self) -> Result<GeoCoordinate, ApiError> {
        let lat = self
            .lat
            .as_deref()
            .ok_or(ApiError::MissingField { field: FIELD_LAT })?;
        let lon = self
            .lon
            .as_deref()
            .ok_or(ApiError::MissingField { field: FIELD_LON })?;
        Ok(GeoCoordinate::parse(lat, lon)?)
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::Multipart {
        status: err.status(),
        reason: err.body_text(),
    }
}

async fn verify_place(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;
    let coordinate = form.coordinate()?;

    let classification = state.classify(image).await?;
    let verdict = state.engine().verify(&classification, coordinate);
    tracing::info!(
        label = %verdict.detected_label(),
        state = verdict.state_code(),
        distance_meters = ?verdict.distance_meters(),
        "verified place"
    );

    Ok(match state.engine().mode() {
        VerificationMode::MultiLandmark => Json(VerdictBody::from(&verdict)).into_response(),
        VerificationMode::SingleLandmark { .. } => {
            Json(ReducedVerdictBody::from(&verdict)).into_response()
        }
    })
}

async fn classify_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IdentificationBody>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;
    let classification = state.classify(image).await?;
    let identification = state.engine().identify(&classification);
    tracing::info!(
        label = %identification.label,
        recognised = identification.recognised,
        "classified image"
    );
    Ok(Json(identification.into()))
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_owned(),
    })
}
