use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{Debt, DebtStatus, DebtWithParties};

/// Shared SELECT for debt reads, expanding both parties in one join
const SELECT_WITH_PARTIES: &str = "SELECT d.id, d.debtor_id, d.creditor_id, d.amount, \
     d.description, d.debt_date, d.due_date, d.status, d.created_at, d.updated_at, \
     db.first_name AS debtor_first_name, db.last_name AS debtor_last_name, \
     db.display_name AS debtor_display_name, db.email AS debtor_email, db.role AS debtor_role, \
     cr.first_name AS creditor_first_name, cr.last_name AS creditor_last_name, \
     cr.display_name AS creditor_display_name, cr.email AS creditor_email, cr.role AS creditor_role \
     FROM debts d \
     JOIN users db ON db.id = d.debtor_id \
     JOIN users cr ON cr.id = d.creditor_id";

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub debt_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

/// Partial update; None fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct DebtChanges {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl DebtChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.description.is_none() && self.due_date.is_none()
    }
}

/// Exact-match filters accepted by GET /api/debts/filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtQueryFilter {
    pub status: Option<DebtStatus>,
    pub debtor: Option<Uuid>,
    pub creditor: Option<Uuid>,
}

/// Which side of a debt the caller is on, for bulk deletion of paid debts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidDebtSide {
    Creditor,
    Debtor,
}

pub struct PgDebtRepository {
    pool: PgPool,
}

impl PgDebtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Latest debts, newest first
    pub async fn list(&self, limit: i64) -> Result<Vec<DebtWithParties>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_PARTIES} ORDER BY d.created_at DESC LIMIT $1");
        sqlx::query_as::<_, DebtWithParties>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_filtered(
        &self,
        filter: &DebtQueryFilter,
        limit: i64,
    ) -> Result<Vec<DebtWithParties>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_WITH_PARTIES);
        let mut first = true;

        if let Some(status) = filter.status {
            push_clause(&mut qb, &mut first);
            qb.push("d.status = ").push_bind(status);
        }
        if let Some(debtor) = filter.debtor {
            push_clause(&mut qb, &mut first);
            qb.push("d.debtor_id = ").push_bind(debtor);
        }
        if let Some(creditor) = filter.creditor {
            push_clause(&mut qb, &mut first);
            qb.push("d.creditor_id = ").push_bind(creditor);
        }

        qb.push(" ORDER BY d.created_at DESC LIMIT ").push_bind(limit);

        qb.build_query_as::<DebtWithParties>()
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DebtWithParties>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_PARTIES} WHERE d.id = $1");
        sqlx::query_as::<_, DebtWithParties>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert(&self, debt: NewDebt) -> Result<Debt, sqlx::Error> {
        sqlx::query_as::<_, Debt>(
            "INSERT INTO debts (debtor_id, creditor_id, amount, description, debt_date, due_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(debt.debtor_id)
        .bind(debt.creditor_id)
        .bind(debt.amount)
        .bind(debt.description)
        .bind(debt.debt_date)
        .bind(debt.due_date)
        .bind(DebtStatus::Unpaid)
        .fetch_one(&self.pool)
        .await
    }

    /// Apply a partial update, returning the updated debt with parties expanded
    pub async fn update(
        &self,
        id: Uuid,
        changes: DebtChanges,
    ) -> Result<Option<DebtWithParties>, sqlx::Error> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE debts SET updated_at = now()");

        if let Some(amount) = changes.amount {
            qb.push(", amount = ").push_bind(amount);
        }
        if let Some(description) = changes.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(due_date) = changes.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }

        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Debt>, sqlx::Error> {
        sqlx::query_as::<_, Debt>("DELETE FROM debts WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn mark_paid(&self, id: Uuid) -> Result<Option<Debt>, sqlx::Error> {
        sqlx::query_as::<_, Debt>(
            "UPDATE debts SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(DebtStatus::Paid)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete every paid debt where the user is on the given side; returns the count
    pub async fn delete_paid(
        &self,
        user_id: Uuid,
        side: PaidDebtSide,
    ) -> Result<u64, sqlx::Error> {
        let sql = match side {
            PaidDebtSide::Creditor => {
                "DELETE FROM debts WHERE status = $1 AND creditor_id = $2"
            }
            PaidDebtSide::Debtor => "DELETE FROM debts WHERE status = $1 AND debtor_id = $2",
        };

        let result = sqlx::query(sql)
            .bind(DebtStatus::Paid)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn push_clause(qb: &mut QueryBuilder<Postgres>, first: &mut bool) {
    if *first {
        qb.push(" WHERE ");
        *first = false;
    } else {
        qb.push(" AND ");
    }
}
