//! Cloudflare Turnstile bot verification, used to gate the forgot-password
//! endpoint. Disabled entirely when no secret is configured.

use serde::Deserialize;

use crate::config;
use crate::error::ApiError;

const VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// Validate a client-supplied Turnstile token. No-op when unconfigured.
pub async fn require_verification(token: Option<&str>) -> Result<(), ApiError> {
    let secret = match &config::config().security.turnstile_secret {
        Some(secret) => secret,
        None => return Ok(()),
    };

    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::bad_request("Bot verification required")),
    };

    let response = reqwest::Client::new()
        .post(VERIFY_URL)
        .form(&[("secret", secret.as_str()), ("response", token)])
        .send()
        .await
        .map_err(|e| {
            tracing::error!("turnstile verification request failed: {}", e);
            ApiError::bad_gateway("Bot verification unavailable")
        })?;

    let body: VerifyResponse = response.json().await.map_err(|e| {
        tracing::error!("turnstile verification returned invalid body: {}", e);
        ApiError::bad_gateway("Bot verification unavailable")
    })?;

    if !body.success {
        return Err(ApiError::forbidden("Bot verification failed"));
    }

    Ok(())
}
