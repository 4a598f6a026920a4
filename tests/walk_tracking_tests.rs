// SPDX-License-Identifier: MIT

//! Live walk session tests over the HTTP surface.
//!
//! Sessions are seeded directly into the registry so the flows run against
//! the offline mock database; persistence is exercised separately against
//! the emulator.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use seepaw_api::middleware::auth::Role;
use seepaw_api::services::walk::WalkHandle;
use std::time::Duration;
use tower::ServiceExt;

mod common;

// ~10 m of latitude at the mean Earth radius
const LAT_STEP_10M: f64 = 10.0 / 111_194.93;

/// A 202 on the fixes route acknowledges enqueueing; wait until the tracker
/// actor has actually applied the expected number of fixes.
async fn wait_for_fix_count(handle: &WalkHandle, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while handle.snapshot().fix_count < expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("tracker did not apply the enqueued fixes");
}

fn fix_request(walk_id: &str, token: &str, latitude: f64, longitude: f64) -> Request<Body> {
    let body = serde_json::json!({
        "latitude": latitude,
        "longitude": longitude
    });
    Request::builder()
        .method("POST")
        .uri(format!("/api/walks/{}/fixes", walk_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_fixes_accumulate_into_live_snapshot() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", Role::User);

    let handle = state.walks.begin(
        "animal-1".to_string(),
        "Rex".to_string(),
        "user-1".to_string(),
    );

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(fix_request(
                &handle.walk_id,
                &token,
                37.42 + i as f64 * LAT_STEP_10M,
                -122.08,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    wait_for_fix_count(&handle, 3).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/walks/{}/live", handle.walk_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(snapshot["fix_count"], 3);
    let distance = snapshot["distance_meters"].as_f64().unwrap();
    assert!(
        (distance - 20.0).abs() < 0.1,
        "expected ~20m, got {}",
        distance
    );
}

#[tokio::test]
async fn test_fix_for_unknown_session_is_not_found() {
    let (app, _state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", Role::User);

    let response = app
        .oneshot(fix_request("no-such-walk", &token, 37.42, -122.08))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_is_single_writer() {
    let (app, state) = common::create_test_app();
    let intruder_token = common::create_test_jwt("user-2", Role::User);

    let handle = state.walks.begin(
        "animal-1".to_string(),
        "Rex".to_string(),
        "user-1".to_string(),
    );

    // Another authenticated user may not feed someone else's session
    let response = app
        .clone()
        .oneshot(fix_request(&handle.walk_id, &intruder_token, 37.42, -122.08))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor observe it
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/walks/{}/live", handle.walk_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", intruder_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_failed_persistence_keeps_session_for_retry() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", Role::User);

    let handle = state.walks.begin(
        "animal-1".to_string(),
        "Rex".to_string(),
        "user-1".to_string(),
    );

    let response = app
        .clone()
        .oneshot(fix_request(&handle.walk_id, &token, 37.42, -122.08))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_fix_count(&handle, 1).await;

    let stop_request = || {
        Request::builder()
            .method("POST")
            .uri(format!("/api/walks/{}/stop", handle.walk_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap()
    };

    // The offline mock fails the write; the session must survive for a retry
    let response = app.clone().oneshot(stop_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.walks.get(&handle.walk_id).is_some());

    // The retry reaches persistence again instead of losing the summary
    let response = app.oneshot(stop_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.walks.get(&handle.walk_id).is_some());
}

#[tokio::test]
async fn test_fix_after_stop_is_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", Role::User);

    let handle = state.walks.begin(
        "animal-1".to_string(),
        "Rex".to_string(),
        "user-1".to_string(),
    );

    // Stop the actor directly; the handle stays registered so the HTTP layer
    // sees a session whose task has exited
    handle.stop().await.unwrap();

    let response = app
        .oneshot(fix_request(&handle.walk_id, &token, 37.42, -122.08))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
