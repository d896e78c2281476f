//! JSON API over a real listener

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use lph_assistant::AssistantService;
use lph_core::EntityKind;
use lph_desk::auth::hash_password;
use lph_desk::{serve, Desk, DeskConfig};
use lph_store::MemoryStore;

async fn start() -> String {
    let admin = match json!({
        "id": "u-admin",
        "username": "admin_unisma",
        "role": "ADMIN",
        "passwordHash": hash_password("admin-pass").unwrap()
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let store = Arc::new(MemoryStore::with_records([(EntityKind::AppUser, vec![admin])]));
    let desk = Desk::new(store, AssistantService::unconfigured(), DeskConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(desk, listener));
    format!("http://{addr}")
}

#[tokio::test]
async fn test_health() {
    let base = start().await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["assistant"], false);
}

#[tokio::test]
async fn test_guest_flow() {
    let base = start().await;
    let client = reqwest::Client::new();

    let login: Value = client
        .post(format!("{base}/auth/guest"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(login["isGuest"], true);
    assert_eq!(login["user"]["role"], "PUBLIC");
    let token = login["token"].as_str().unwrap().to_string();

    let finance = client
        .get(format!("{base}/api/collections/finance_records"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(finance.status(), 200);
    assert_eq!(finance.json::<Value>().await.unwrap(), "ACCESS_DENIED_FOR_GUEST");

    let create = client
        .post(format!("{base}/api/tasks"))
        .bearer_auth(&token)
        .json(&json!({"title": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status(), 403);

    let unknown = client
        .get(format!("{base}/api/collections/nope"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);

    let logout = client
        .post(format!("{base}/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 200);

    let after = client
        .get(format!("{base}/api/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), 401);
    let body: Value = after.json().await.unwrap();
    assert_eq!(body["code"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_admin_task_lifecycle() {
    let base = start().await;
    let client = reqwest::Client::new();

    let bad = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"username": "admin_unisma", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 401);

    let login: Value = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"username": "admin_unisma", "password": "admin-pass"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap().to_string();

    let task: Value = client
        .post(format!("{base}/api/tasks"))
        .bearer_auth(&token)
        .json(&json!({"title": "Cek berkas PU", "description": "Batch Januari"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(task["status"], "Pending");
    let id = task["id"].as_str().unwrap().to_string();

    let complete_early = client
        .post(format!("{base}/api/tasks/{id}/complete"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(complete_early.status(), 409);

    for step in ["claim", "complete"] {
        let response = client
            .post(format!("{base}/api/tasks/{id}/{step}"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "{step}");
    }

    let board: Value = client
        .get(format!("{base}/api/tasks"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["completed"][0]["completedBy"], "admin_unisma");

    let deleted = client
        .delete(format!("{base}/api/tasks/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let missing_title = client
        .post(format!("{base}/api/tasks"))
        .bearer_auth(&token)
        .json(&json!({"title": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_title.status(), 400);
}
