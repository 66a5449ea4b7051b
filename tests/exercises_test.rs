mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_ids_are_sequential() {
    let app = TestApp::new().await;

    for (expected, name) in ["Squat", "Bench", "Deadlift"].iter().enumerate() {
        let created = app.create_exercise(name).await;
        assert_eq!(created["id"], (expected + 1).to_string());
    }
}

#[tokio::test]
async fn test_delete_repacks_ids() {
    let app = TestApp::new().await;
    for name in ["Squat", "Bench", "Deadlift", "Row"] {
        app.create_exercise(name).await;
    }

    assert_eq!(app.delete("/api/exercises/2").await.status, StatusCode::NO_CONTENT);

    let listed = app.get("/api/exercises").await;
    let pairs: Vec<(String, String)> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["id"].as_str().unwrap().to_string(), e["name"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("1".to_string(), "Squat".to_string()),
            ("2".to_string(), "Deadlift".to_string()),
            ("3".to_string(), "Row".to_string()),
        ]
    );

    let next = app.create_exercise("Press").await;
    assert_eq!(next["id"], "4");
}

#[tokio::test]
async fn test_missing_exercise_is_404() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/api/exercises/9").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/api/exercises/9").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.put("/api/exercises/9", json!({ "name": "x" })).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_update_and_filter() {
    let app = TestApp::new().await;
    app.post("/api/exercises", json!({ "name": "Back Squat", "category": "Legs" })).await;
    app.post("/api/exercises", json!({ "name": "Bench Press", "category": "Push" })).await;

    let updated = app
        .put("/api/exercises/2", json!({ "instructions": "Touch the chest" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Bench Press");
    assert_eq!(updated.body["instructions"], "Touch the chest");

    let legs = app.get("/api/exercises?category=legs").await;
    assert_eq!(legs.body.as_array().unwrap().len(), 1);
    assert_eq!(legs.body[0]["name"], "Back Squat");

    let search = app.get("/api/exercises?search=press").await;
    assert_eq!(search.body.as_array().unwrap().len(), 1);
    assert_eq!(search.body[0]["id"], "2");
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = TestApp::new().await;

    let response = app.post("/api/exercises", json!({ "category": "Legs" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "name is required");
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = TestApp::new().await;
    app.create_exercise("Squat").await;
    app.create_exercise("Tempo 100% Squat").await;

    let response = app.get("/api/exercises?search=%25").await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<_> = response.body.as_array().unwrap().iter().map(|e| e["name"].clone()).collect();
    assert_eq!(names, [json!("Tempo 100% Squat")]);
}
