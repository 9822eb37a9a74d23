use axum::extract::Path;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Debt, DebtWithParties};
use crate::database::repository::PgDebtRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::validation;

/// GET /api/debts/:id
pub async fn debt_get(Path(debt_id): Path<Uuid>) -> Result<ApiResponse<DebtWithParties>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let debt = repo
        .find_by_id(debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    Ok(ApiResponse::success(debt))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDebtRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// PUT /api/debts/:id - partial update of amount, description, due date
pub async fn debt_update(
    Path(debt_id): Path<Uuid>,
    Json(payload): Json<UpdateDebtRequest>,
) -> Result<ApiResponse<DebtWithParties>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    // A new due date is checked against the stored debt date
    let existing = repo
        .find_by_id(debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    let changes = validation::debt_update(
        payload.amount,
        payload.description.as_deref(),
        payload.due_date,
        existing.debt_date,
    )?;

    let updated = repo
        .update(debt_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/debts/:id - remove a debt, returning the deleted row
pub async fn debt_delete(Path(debt_id): Path<Uuid>) -> Result<ApiResponse<Debt>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    let debt = repo
        .delete(debt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    Ok(ApiResponse::success(debt))
}
