use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::repository::PreferenceRepository;
use super::service::{PreferenceService, PreferenceServiceError};
use crate::workflows::eligibility::EligibilityError;

/// Request body for replacing a student's list.
#[derive(Debug, Clone, Deserialize)]
pub struct SavePreferencesRequest {
    pub codes: Vec<String>,
}

/// Router exposing the preference window and per-student lists.
pub fn preference_router<R>(service: Arc<PreferenceService<R>>) -> Router
where
    R: PreferenceRepository + 'static,
{
    Router::new()
        .route("/api/v1/setup", get(setup_handler::<R>))
        .route(
            "/api/v1/students/:student_id/preferences",
            get(load_handler::<R>).put(save_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn setup_handler<R>(State(service): State<Arc<PreferenceService<R>>>) -> Response
where
    R: PreferenceRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.setup(Utc::now()))).into_response()
}

pub(crate) async fn load_handler<R>(
    State(service): State<Arc<PreferenceService<R>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: PreferenceRepository + 'static,
{
    match service.overview(&student_id, Utc::now()) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<PreferenceService<R>>>,
    Path(student_id): Path<String>,
    axum::Json(request): axum::Json<SavePreferencesRequest>,
) -> Response
where
    R: PreferenceRepository + 'static,
{
    match service.submit(&student_id, request.codes, Utc::now()) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PreferenceServiceError) -> Response {
    let status = match &error {
        PreferenceServiceError::Rule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PreferenceServiceError::Eligibility(EligibilityError::StudentNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        PreferenceServiceError::Eligibility(EligibilityError::MissingEligibleGroups(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PreferenceServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
