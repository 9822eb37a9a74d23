use axum::Json;
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::repository::PgUserRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::{AuthService, AuthSession};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - verify credentials and return a session token
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<ApiResponse<AuthSession>, ApiError> {
    let input = validation::login(payload.email.as_deref(), payload.password.as_deref())?;

    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(PgUserRepository::new(pool));
    let session = service.login(input).await?;

    Ok(ApiResponse::success(session))
}
