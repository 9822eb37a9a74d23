use axum::extract::Query;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::DebtWithParties;
use crate::database::repository::{DebtQueryFilter, PgDebtRepository};
use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// GET /api/debts - latest debts, newest first
pub async fn debt_list() -> Result<ApiResponse<Vec<DebtWithParties>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let debts = repo.list(config::config().api.debt_page_size).await?;
    Ok(ApiResponse::success(debts))
}

/// GET /api/debts/filter - exact-match filtering by status, debtor, creditor
pub async fn debt_filter(
    Query(filter): Query<DebtQueryFilter>,
) -> Result<ApiResponse<Vec<DebtWithParties>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let debts = repo
        .list_filtered(&filter, config::config().api.debt_page_size)
        .await?;
    Ok(ApiResponse::success(debts))
}
