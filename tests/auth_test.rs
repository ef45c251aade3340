//! Integration tests for auth endpoints.
//!
//! Requires the server to be running on localhost:8000.

mod common;

use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn register_user(
    client: &reqwest::Client,
    username: &str,
    password: &str,
    chess_com: Option<&str>,
) -> reqwest::Response {
    client
        .post(common::url("/api/auth/register"))
        .json(&json!({
            "username": username,
            "password": password,
            "chessComUsername": chess_com,
        }))
        .send()
        .await
        .expect("Failed to send register request")
}

async fn login_user(client: &reqwest::Client, username: &str, password: &str) -> reqwest::Response {
    client
        .post(common::url("/api/auth/login"))
        .json(&json!({
            "username": username,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to send login request")
}

async fn get_me(client: &reqwest::Client, token: &str) -> reqwest::Response {
    client
        .get(common::url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send me request")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Full auth flow: register → login → me.
#[tokio::test]
async fn register_login_and_me() {
    let client = common::client();
    let suffix = common::unique_suffix();
    let username = format!("testuser_{suffix}");

    // ── Register ────────────────────────────────────────────────────
    let resp = register_user(&client, &username, common::TEST_PASSWORD, Some("hikaru")).await;
    assert_eq!(resp.status(), 200, "Register should succeed");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], username);
    assert_eq!(body["user"]["chessComUsername"], "hikaru");
    assert!(body["token"].is_string(), "Should return a JWT token");

    // ── Login ───────────────────────────────────────────────────────
    let resp = login_user(&client, &username, common::TEST_PASSWORD).await;
    assert_eq!(resp.status(), 200, "Login should succeed");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], username);
    let token = body["token"].as_str().unwrap().to_string();

    // ── Me ──────────────────────────────────────────────────────────
    let resp = get_me(&client, &token).await;
    assert_eq!(resp.status(), 200, "GET /me should succeed with valid token");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], username);
}

/// The Authorization header may carry the bare token.
#[tokio::test]
async fn raw_token_header_accepted() {
    let client = common::client();
    let token = common::register_fresh_user(&client, "rawtok").await;

    let resp = client
        .get(common::url("/api/auth/me"))
        .header("Authorization", token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

/// Registering the same username twice should fail.
#[tokio::test]
async fn register_duplicate_username_fails() {
    let client = common::client();
    let username = format!("dupuser_{}", common::unique_suffix());

    let resp = register_user(&client, &username, common::TEST_PASSWORD, None).await;
    assert_eq!(resp.status(), 200);

    let resp = register_user(&client, &username, common::TEST_PASSWORD, None).await;
    assert_eq!(resp.status(), 400, "Duplicate username should be rejected");

    let body: Value = resp.json().await.unwrap();
    assert!(
        body["detail"].as_str().unwrap().contains("Username"),
        "Error should mention username: got {:?}",
        body["detail"]
    );
}

/// Short passwords and odd usernames are rejected before touching the database.
#[tokio::test]
async fn register_validation_fails() {
    let client = common::client();

    let resp = register_user(&client, &format!("shortpw_{}", common::unique_suffix()), "short", None).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("Password"));

    let resp = register_user(&client, "bad name!", common::TEST_PASSWORD, None).await;
    assert_eq!(resp.status(), 400);
}

/// Login with wrong password should fail.
#[tokio::test]
async fn login_wrong_password_fails() {
    let client = common::client();
    let username = format!("wrongpw_{}", common::unique_suffix());

    let resp = register_user(&client, &username, "correctpass1", None).await;
    assert_eq!(resp.status(), 200);

    let resp = login_user(&client, &username, "wrongpassword").await;
    assert_eq!(resp.status(), 400, "Wrong password should be rejected");
}

/// Password change takes effect on the next login.
#[tokio::test]
async fn update_password_then_login() {
    let client = common::client();
    let username = format!("chpw_{}", common::unique_suffix());

    let resp = register_user(&client, &username, common::TEST_PASSWORD, None).await;
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let resp = client
        .put(common::url("/api/auth/password"))
        .bearer_auth(token)
        .json(&json!({ "newPassword": "brandnewpass1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(login_user(&client, &username, common::TEST_PASSWORD).await.status(), 400);
    assert_eq!(login_user(&client, &username, "brandnewpass1").await.status(), 200);
}

/// Chess.com username update is reflected by /me.
#[tokio::test]
async fn update_chess_com_username() {
    let client = common::client();
    let token = common::register_fresh_user(&client, "chesscom").await;

    let resp = client
        .put(common::url("/api/auth/chess-com"))
        .bearer_auth(&token)
        .json(&json!({ "chessComUsername": "magnus" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["chessComUsername"], "magnus");

    let body: Value = get_me(&client, &token).await.json().await.unwrap();
    assert_eq!(body["chessComUsername"], "magnus");
}

/// GET /me without a token should fail.
#[tokio::test]
async fn me_without_token_fails() {
    let client = common::client();
    let resp = client
        .get(common::url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401, "No token should return 401");
}

/// GET /me with an invalid token should fail.
#[tokio::test]
async fn me_with_invalid_token_fails() {
    let client = common::client();
    let resp = get_me(&client, "this.is.not.a.valid.jwt").await;
    assert_eq!(resp.status(), 401, "Invalid token should return 401");
}
