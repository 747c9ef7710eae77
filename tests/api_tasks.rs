//! End-to-end tests for the HTTP surface: each test boots the router on a
//! random port with a fresh in-memory store and drives it with a real client.

use serde_json::{json, Value};
use taskboard::db::db::Db;
use taskboard::db::tasks::Tasks;
use taskboard::server::{build_router, AppState};

async fn start_test_server() -> String {
    let tasks = Tasks::new(Db::open_in_memory().unwrap()).unwrap();
    let state = AppState::new(tasks).unwrap();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn create_then_list_round_trip() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "buy milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    let tasks: Value = client
        .get(format!("{base}/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let task = tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == json!(id))
        .unwrap();
    assert_eq!(task["description"], "buy milk");
    assert_eq!(task["status"], "Todo");
    assert_eq!(task["priority"], "Medium");
    assert_eq!(task["position"], 1);
    assert_eq!(task["due_date"], Value::Null);
}

#[tokio::test]
async fn create_rejects_empty_description() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn create_rejects_unknown_status() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "typed", "status": "Blocked" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let tasks: Value = client
        .get(format!("{base}/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_subset_and_missing_id() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "write report", "priority": "High" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["id"].as_i64().unwrap();

    let response = client
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "status": "Done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let tasks: Value = client
        .get(format!("{base}/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let task = &tasks.as_array().unwrap()[0];
    assert_eq!(task["status"], "Done");
    assert_eq!(task["priority"], "High");
    assert_eq!(task["description"], "write report");

    let response = client
        .put(format!("{base}/tasks/999"))
        .json(&json!({ "status": "Done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn delete_then_not_found() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "doomed" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{base}/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{base}/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn reorder_applies_positions() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for description in ["a", "b", "c"] {
        let body: Value = client
            .post(format!("{base}/tasks"))
            .json(&json!({ "description": description }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(body["id"].as_i64().unwrap());
    }

    // Reverse the order; the unknown id is skipped without failing the call
    let response = client
        .post(format!("{base}/tasks/reorder"))
        .json(&json!({ "tasks": [
            { "id": ids[0], "position": 3 },
            { "id": ids[1], "position": 2 },
            { "id": ids[2], "position": 1 },
            { "id": 999, "position": 1 },
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let tasks: Value = client
        .get(format!("{base}/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed: Vec<_> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
}

#[tokio::test]
async fn health_reports_task_count() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "tracked" }))
        .send()
        .await
        .unwrap();

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["task_count"], 1);
}

#[tokio::test]
async fn index_page_renders_tasks() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/tasks"))
        .json(&json!({ "description": "visible on page" }))
        .send()
        .await
        .unwrap();

    let response = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("visible on page"));
}

#[tokio::test]
async fn static_assets_are_served() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/static/script/modal.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{base}/static/missing.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
