use axum::Extension;

use crate::database::manager::DatabaseManager;
use crate::database::models::UserSummary;
use crate::database::repository::PgUserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::services::AuthService;

/// GET /api/auth/me - profile of the authenticated user
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> Result<ApiResponse<UserSummary>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(PgUserRepository::new(pool));

    // The token can outlive the account; report that as not found
    let user = service.get_me(auth_user.user_id).await?;

    Ok(ApiResponse::success(user))
}
