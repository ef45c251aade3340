#![allow(dead_code)]

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub const BASE_URL: &str = "http://localhost:8000";

pub const TEST_PASSWORD: &str = "testpass123";

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Generate a unique suffix based on timestamp + random bits to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000)
}

/// Build a URL for an API endpoint.
pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Register a fresh user and return its token.
pub async fn register_fresh_user(client: &Client, prefix: &str) -> String {
    let username = format!("{prefix}_{}", unique_suffix());
    let resp = client
        .post(url("/api/auth/register"))
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(resp.status(), 200, "Register should succeed");

    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Create a note and return its id.
pub async fn create_note(client: &Client, token: &str, pgn: &str) -> i64 {
    let resp = client
        .post(url("/api/notes"))
        .bearer_auth(token)
        .json(&json!({ "pgn": pgn }))
        .send()
        .await
        .expect("Failed to send create note request");
    assert_eq!(resp.status(), 201, "Create note should succeed");

    let body: Value = resp.json().await.unwrap();
    body["id"].as_i64().unwrap()
}
