use axum::Json;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::models::Debt;
use crate::database::repository::PgDebtRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateDebtRequest {
    pub debtor: Option<String>,
    pub creditor: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub debt_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// POST /api/debts - record a new unpaid debt
pub async fn debt_create(
    Json(payload): Json<CreateDebtRequest>,
) -> Result<ApiResponse<Debt>, ApiError> {
    let new_debt = validation::debt_create(
        payload.debtor.as_deref(),
        payload.creditor.as_deref(),
        payload.amount,
        payload.description.as_deref(),
        payload.debt_date,
        payload.due_date,
        Utc::now().date_naive(),
    )?;

    let pool = DatabaseManager::pool().await?;
    let repo = PgDebtRepository::new(pool);

    match repo.insert(new_debt).await {
        Ok(debt) => Ok(ApiResponse::created(debt)),
        Err(e) if is_foreign_key_violation(&e) => Err(ApiError::validation_error(
            "Debtor and creditor must be existing users",
            None,
        )),
        Err(e) => Err(e.into()),
    }
}

// Postgres error 23503: one of the party ids does not reference a user row
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}
