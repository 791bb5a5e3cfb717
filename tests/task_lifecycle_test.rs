mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use wave_api::entities::{quote, task};

use common::{json_body, TestApp};

fn task_payload(lat: f64, lon: f64) -> serde_json::Value {
    json!({
        "title": "Fix my fence",
        "description": "Two broken panels on the back fence",
        "category": "handyman",
        "latitude": lat,
        "longitude": lon,
        "reward": "$40"
    })
}

#[tokio::test]
async fn created_tasks_start_open_and_unassigned() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let token = app.token_for(&poster);

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["status"], "open");
    assert!(body["helper_id"].is_null());
    assert!(body["charges"].is_null());
    assert!(body["hours"].is_null());
    assert_eq!(body["poster_id"], poster.id);
    assert_eq!(body["title"], "Fix my fence");
}

#[tokio::test]
async fn create_task_requires_all_core_fields() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let token = app.token_for(&poster);

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks",
            Some(json!({
                "title": "Fix my fence",
                "description": "no category or coordinates"
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_task_rejects_out_of_range_coordinates() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let token = app.token_for(&poster);

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(123.0, 0.0)),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_task_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn either_participant_may_complete_but_strangers_may_not() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let stranger = app.register_user("stranger", "stranger@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let stranger_token = app.token_for(&stranger);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/tasks/{}/complete", task_id),
            None,
            Some(&stranger_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The poster can close out an open, never-assigned task directly
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/tasks/{}/complete", task_id),
            None,
            Some(&poster_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "completed");
    assert!(body["helper_id"].is_null());
}

#[tokio::test]
async fn completing_a_missing_task_is_not_found() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let token = app.token_for(&poster);

    let response = app
        .request(Method::POST, "/api/v1/tasks/9999/complete", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_cascades_quotes_and_requires_open_owned_task() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let helper = app.register_user("helper", "helper@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap() as i32;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/tasks/{}/quote", task_id),
            Some(json!({ "charges": 50.0, "hours": 2.0, "mobile": "555" })),
            Some(&helper_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Only the poster may delete
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/tasks/{}", task_id),
            None,
            Some(&helper_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/tasks/{}", task_id),
            None,
            Some(&poster_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let remaining_quotes = quote::Entity::find()
        .filter(quote::Column::TaskId.eq(task_id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(remaining_quotes, 0);

    let remaining_task = task::Entity::find_by_id(task_id)
        .one(&*app.state.db)
        .await
        .unwrap();
    assert!(remaining_task.is_none());
}

#[tokio::test]
async fn only_open_tasks_can_be_deleted() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let helper = app.register_user("helper", "helper@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    let quote_body = json_body(
        app.request(
            Method::POST,
            &format!("/api/v1/tasks/{}/quote", task_id),
            Some(json!({ "charges": 50.0, "hours": 2.0, "mobile": "555" })),
            Some(&helper_token),
        )
        .await,
    )
    .await;
    let quote_id = quote_body["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotes/{}/accept", quote_id),
            None,
            Some(&poster_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/tasks/{}", task_id),
            None,
            Some(&poster_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_image_upload_enforces_ownership_and_extension() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let helper = app.register_user("helper", "helper@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();
    let uri = format!("/api/v1/tasks/{}/image", task_id);

    // Not the poster
    let response = app
        .upload_image(&uri, &helper_token, "fence.png", b"fake-png-bytes")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Wrong extension
    let response = app
        .upload_image(&uri, &poster_token, "notes.txt", b"not an image")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Accepted
    let response = app
        .upload_image(&uri, &poster_token, "fence.png", b"fake-png-bytes")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let url = body["image_url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"), "got {}", url);
    assert!(url.ends_with("fence.png"));

    let stored = task::Entity::find_by_id(task_id as i32)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.image_url.as_deref(), Some(url));
}

#[tokio::test]
async fn poster_listing_includes_quotes_and_derived_pending_flag() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let helper = app.register_user("helper", "helper@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    app.request(
        Method::POST,
        &format!("/api/v1/tasks/{}/quote", task_id),
        Some(json!({ "charges": 25.0, "hours": 1.5, "mobile": "555" })),
        Some(&helper_token),
    )
    .await;

    let body = json_body(
        app.request(Method::GET, "/api/v1/tasks/mine", None, Some(&poster_token))
            .await,
    )
    .await;

    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["task"]["id"].as_i64().unwrap(), task_id);
    assert_eq!(mine[0]["quotes"].as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["has_pending_quotes"], true);
    assert_eq!(mine[0]["ratings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn assigned_and_completed_listings_follow_the_helper() {
    let app = TestApp::new().await;
    let poster = app.register_user("poster", "poster@example.com", "seeker").await;
    let helper = app.register_user("helper", "helper@example.com", "user").await;
    let poster_token = app.token_for(&poster);
    let helper_token = app.token_for(&helper);

    let created = json_body(
        app.request(
            Method::POST,
            "/api/v1/tasks",
            Some(task_payload(0.0, 0.0)),
            Some(&poster_token),
        )
        .await,
    )
    .await;
    let task_id = created["id"].as_i64().unwrap();

    let quote_body = json_body(
        app.request(
            Method::POST,
            &format!("/api/v1/tasks/{}/quote", task_id),
            Some(json!({ "charges": 50.0, "hours": 2.0, "mobile": "555" })),
            Some(&helper_token),
        )
        .await,
    )
    .await;

    app.request(
        Method::POST,
        &format!("/api/v1/quotes/{}/accept", quote_body["id"].as_i64().unwrap()),
        None,
        Some(&poster_token),
    )
    .await;

    let assigned = json_body(
        app.request(Method::GET, "/api/v1/tasks/assigned", None, Some(&helper_token))
            .await,
    )
    .await;
    assert_eq!(assigned.as_array().unwrap().len(), 1);

    // Nothing completed yet; the public listing is empty
    let completed = json_body(
        app.request(
            Method::GET,
            &format!("/api/v1/tasks/completed/{}", helper.id),
            None,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(completed.as_array().unwrap().len(), 0);

    app.request(
        Method::POST,
        &format!("/api/v1/tasks/{}/complete", task_id),
        None,
        Some(&helper_token),
    )
    .await;

    let completed = json_body(
        app.request(
            Method::GET,
            &format!("/api/v1/tasks/completed/{}", helper.id),
            None,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
}
