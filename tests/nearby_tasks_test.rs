mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{json_body, TestApp};

async fn post_task_at(app: &TestApp, token: &str, lat: f64, lon: f64) -> i64 {
    let body = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(json!({
                "title": "Water my plants",
                "description": "Once, while I'm away",
                "category": "garden",
                "latitude": lat,
                "longitude": lon
            })),
            Some(token),
        )
        .await,
    )
    .await;
    body["id"].as_i64().unwrap()
}

async fn set_location(app: &TestApp, token: &str, lat: f64, lon: f64) {
    let response = app
        .request(
            Method::PUT,
            "/api/v1/profile/location",
            Some(json!({ "latitude": lat, "longitude": lon })),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn searching_without_a_stored_location_fails() {
    let app = TestApp::new().await;
    let user = app.register_user("searcher", "s@example.com", "user").await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/map/tasks?radius=5",
            None,
            Some(&app.token_for(&user)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn radius_outside_bounds_is_rejected() {
    let app = TestApp::new().await;
    let user = app.register_user("searcher", "s@example.com", "user").await;
    let token = app.token_for(&user);
    set_location(&app, &token, 0.0, 0.0).await;

    for bad_radius in ["0.05", "60"] {
        let response = app
            .request(
                Method::GET,
                &format!("/api/v1/map/tasks?radius={}", bad_radius),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "radius {}", bad_radius);
    }
}

#[tokio::test]
async fn colocated_task_is_included_at_the_minimum_radius() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "p@example.com", "seeker").await;
    let searcher = app.register_user("searcher", "s@example.com", "user").await;
    let searcher_token = app.token_for(&searcher);

    post_task_at(&app, &app.token_for(&poster), 0.0, 0.0).await;
    set_location(&app, &searcher_token, 0.0, 0.0).await;

    let body = json_body(
        app.request(
            Method::GET,
            "/api/v1/map/tasks?radius=0.1",
            None,
            Some(&searcher_token),
        )
        .await,
    )
    .await;

    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["distance_km"], 0.0);
}

#[tokio::test]
async fn a_ten_km_task_is_excluded_at_5_and_included_at_15() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "p@example.com", "seeker").await;
    let searcher = app.register_user("searcher", "s@example.com", "user").await;
    let searcher_token = app.token_for(&searcher);

    // (0, 0.09) is roughly 10 km east of the origin along the equator
    let task_id = post_task_at(&app, &app.token_for(&poster), 0.0, 0.09).await;
    set_location(&app, &searcher_token, 0.0, 0.0).await;

    let body = json_body(
        app.request(
            Method::GET,
            "/api/v1/map/tasks?radius=5",
            None,
            Some(&searcher_token),
        )
        .await,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let body = json_body(
        app.request(
            Method::GET,
            "/api/v1/map/tasks?radius=15",
            None,
            Some(&searcher_token),
        )
        .await,
    )
    .await;
    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"].as_i64().unwrap(), task_id);

    let distance = tasks[0]["distance_km"].as_f64().unwrap();
    assert!((distance - 10.0).abs() < 0.1, "expected ~10 km, got {}", distance);
}

#[tokio::test]
async fn the_radius_defaults_to_five_km() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "p@example.com", "seeker").await;
    let searcher = app.register_user("searcher", "s@example.com", "user").await;
    let searcher_token = app.token_for(&searcher);

    post_task_at(&app, &app.token_for(&poster), 0.0, 0.0).await;
    post_task_at(&app, &app.token_for(&poster), 0.0, 0.09).await;
    set_location(&app, &searcher_token, 0.0, 0.0).await;

    let body = json_body(
        app.request(Method::GET, "/api/v1/map/tasks", None, Some(&searcher_token))
            .await,
    )
    .await;

    // Only the colocated task falls inside the default 5 km
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_open_tasks_appear_on_the_map() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "p@example.com", "seeker").await;
    let helper = app.register_user("helper", "h@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let task_id = post_task_at(&app, &poster_token, 0.0, 0.0).await;
    set_location(&app, &helper_token, 0.0, 0.0).await;

    let quote = json_body(
        app.request(
            Method::POST,
            &format!("/api/v1/tasks/{}/quote", task_id),
            Some(json!({ "charges": 20.0, "hours": 1.0, "mobile": "555" })),
            Some(&helper_token),
        )
        .await,
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/v1/quotes/{}/accept", quote["id"].as_i64().unwrap()),
        None,
        Some(&poster_token),
    )
    .await;

    let body = json_body(
        app.request(
            Method::GET,
            "/api/v1/map/tasks?radius=1",
            None,
            Some(&helper_token),
        )
        .await,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
