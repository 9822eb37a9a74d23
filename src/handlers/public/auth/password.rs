use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::repository::PgUserRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::{turnstile, AuthService};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
    pub turnstile_token: Option<String>,
}

/// POST /auth/forgot-password - issue a reset token when the account exists.
/// The response never reveals whether the email matched an account.
pub async fn forgot_password(
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let email = validation::forgot_password(payload.email.as_deref())?;
    turnstile::require_verification(payload.turnstile_token.as_deref()).await?;

    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(PgUserRepository::new(pool));
    service.forgot_password(&email).await?;

    Ok(ApiResponse::success(json!({
        "message": "If that email exists, a reset link has been sent."
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// POST /auth/reset-password - trade a valid reset token for a new password
pub async fn reset_password(
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let input =
        validation::reset_password(payload.token.as_deref(), payload.new_password.as_deref())?;

    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(PgUserRepository::new(pool));
    service.reset_password(input).await?;

    Ok(ApiResponse::success(json!({
        "message": "Password reset successfully."
    })))
}
