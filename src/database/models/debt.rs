use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::user::{UserRole, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "debt_status", rename_all = "lowercase")]
pub enum DebtStatus {
    Unpaid,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Debt {
    pub id: Uuid,
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub debt_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Debt row with both parties expanded, as returned by the read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtWithParties {
    pub id: Uuid,
    pub debtor: UserSummary,
    pub creditor: UserSummary,
    pub amount: Decimal,
    pub description: String,
    pub debt_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Built from a debts/users join; party columns carry debtor_/creditor_ aliases
impl<'r> FromRow<'r, PgRow> for DebtWithParties {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let debtor = UserSummary {
            id: row.try_get("debtor_id")?,
            first_name: row.try_get("debtor_first_name")?,
            last_name: row.try_get("debtor_last_name")?,
            display_name: row.try_get("debtor_display_name")?,
            email: row.try_get("debtor_email")?,
            role: row.try_get::<UserRole, _>("debtor_role")?,
        };

        let creditor = UserSummary {
            id: row.try_get("creditor_id")?,
            first_name: row.try_get("creditor_first_name")?,
            last_name: row.try_get("creditor_last_name")?,
            display_name: row.try_get("creditor_display_name")?,
            email: row.try_get("creditor_email")?,
            role: row.try_get::<UserRole, _>("creditor_role")?,
        };

        Ok(Self {
            id: row.try_get("id")?,
            debtor,
            creditor,
            amount: row.try_get("amount")?,
            description: row.try_get("description")?,
            debt_date: row.try_get("debt_date")?,
            due_date: row.try_get("due_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DebtStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
        assert_eq!(
            serde_json::from_str::<DebtStatus>("\"overdue\"").unwrap(),
            DebtStatus::Overdue
        );
    }
}
