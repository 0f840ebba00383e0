use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::eligibility::eligibility_router;
use crate::workflows::eligibility::router::eligibility_handler;

#[tokio::test]
async fn eligibility_route_returns_the_result() {
    let router = eligibility_router(Arc::new(service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/students/S001/eligibility")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["student_id"], "S001");
    assert_eq!(payload["statistics"]["pass_ratio"], "75.00%");
    assert_eq!(payload["personal"]["academic_levels"]["english"], "前標");
    assert_eq!(payload["school_groups"][0]["school_code"], 5);
}

#[tokio::test]
async fn unknown_student_maps_to_not_found() {
    let response = eligibility_handler(
        State(Arc::new(service())),
        Path("S404".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["student_id"], "S404");
}

#[tokio::test]
async fn blank_groups_map_to_unprocessable() {
    let response = eligibility_handler(
        State(Arc::new(service())),
        Path("S002".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn evaluations_route_tags_each_outcome() {
    let router = eligibility_router(Arc::new(service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/students/S001/evaluations")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["outcome"]["status"], "qualified");
    assert_eq!(payload[3]["outcome"]["status"], "disqualified");
    assert_eq!(payload[3]["outcome"]["reason"]["kind"], "group_not_eligible");
}
