use axum::extract::{Path, Query};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Debt;
use crate::database::repository::{PaidDebtSide, PgDebtRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

/// PATCH /api/debts/:id/paid - settle a debt from any status
pub async fn debt_mark_paid(Path(debt_id): Path<Uuid>) -> Result<ApiResponse<Debt>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let debt = repo
        .mark_paid(debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    Ok(ApiResponse::success(debt))
}

#[derive(Debug, Deserialize)]
pub struct DeletePaidQuery {
    pub mode: Option<String>,
}

/// DELETE /api/debts/paid?mode=creditor|debtor - bulk-delete the caller's
/// settled debts on one side of the ledger
pub async fn paid_debts_delete(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DeletePaidQuery>,
) -> Result<ApiResponse<Value>, ApiError> {
    let side = match query.mode.as_deref() {
        Some("creditor") => PaidDebtSide::Creditor,
        Some("debtor") => PaidDebtSide::Debtor,
        _ => return Err(ApiError::bad_request("Mode must be creditor or debtor")),
    };

    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let deleted_count = repo.delete_paid(auth_user.user_id, side).await?;

    Ok(ApiResponse::success(json!({
        "deleted_count": deleted_count
    })))
}
