use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::service::{EligibilityError, EligibilityService};

/// Read-only endpoints over the loaded reference snapshot.
pub fn eligibility_router(service: Arc<EligibilityService>) -> Router {
    Router::new()
        .route(
            "/api/v1/students/:student_id/eligibility",
            get(eligibility_handler),
        )
        .route(
            "/api/v1/students/:student_id/evaluations",
            get(evaluations_handler),
        )
        .with_state(service)
}

pub(crate) async fn eligibility_handler(
    State(service): State<Arc<EligibilityService>>,
    Path(student_id): Path<String>,
) -> Response {
    match service.build_student_result(&student_id, Utc::now()) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluations_handler(
    State(service): State<Arc<EligibilityService>>,
    Path(student_id): Path<String>,
) -> Response {
    match service.explain(&student_id) {
        Ok(evaluations) => (StatusCode::OK, axum::Json(evaluations)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EligibilityError) -> Response {
    let status = match error {
        EligibilityError::StudentNotFound(_) => StatusCode::NOT_FOUND,
        EligibilityError::MissingEligibleGroups(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "student_id": error.student_id().as_str(),
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
