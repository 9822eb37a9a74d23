mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_rejects_invalid_payload_with_field_errors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let payload = json!({
        "first_name": "Ada99",
        "last_name": "Lovelace",
        "email": "not-an-email",
        "password": "short"
    });

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&payload)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["field_errors"]["first_name"],
        "First name can only contain letters, spaces, hyphens, and apostrophes"
    );
    assert_eq!(body["field_errors"]["email"], "Invalid email format");
    assert_eq!(
        body["field_errors"]["password"],
        "Password must be at least 8 characters"
    );
    Ok(())
}

#[tokio::test]
async fn register_without_body_is_a_client_error() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .send()
        .await?;

    assert!(
        res.status().is_client_error(),
        "expected client error, got {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn login_requires_a_well_formed_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": "nope", "password": "Sup3r-Secret" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["field_errors"]["email"], "Invalid email format");
    Ok(())
}

#[tokio::test]
async fn forgot_password_validates_email_before_anything_else() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/forgot-password", server.base_url))
        .json(&json!({ "email": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["field_errors"]["email"], "Email is required");
    Ok(())
}

#[tokio::test]
async fn reset_password_enforces_the_password_policy() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/reset-password", server.base_url))
        .json(&json!({ "token": "some-token", "new_password": "weakpassword" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"]["new_password"]
        .as_str()
        .unwrap()
        .contains("uppercase letter"));
    Ok(())
}

#[tokio::test]
async fn me_requires_a_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .header("authorization", "Bearer garbage.token.here")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}
