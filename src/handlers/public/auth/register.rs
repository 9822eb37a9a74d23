use axum::Json;
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::repository::PgUserRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::{AuthService, AuthSession};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/register - create an account and return a session token
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<AuthSession>, ApiError> {
    let input = validation::registration(
        payload.first_name.as_deref(),
        payload.last_name.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    )?;

    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(PgUserRepository::new(pool));
    let session = service.register(input).await?;

    Ok(ApiResponse::created(session))
}
