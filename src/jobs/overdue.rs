//! Nightly sweep that moves unpaid debts past their due date to overdue.

use chrono::{DateTime, Days, Utc};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::database::models::DebtStatus;

/// One conditional bulk update; safe to run any number of times per day.
pub async fn sweep_overdue(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE debts SET status = $1, updated_at = now() \
         WHERE status = $2 AND due_date IS NOT NULL AND due_date < CURRENT_DATE",
    )
    .bind(DebtStatus::Overdue)
    .bind(DebtStatus::Unpaid)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Time remaining until the next UTC midnight. Exactly at midnight this is a
/// full day, so a sweep that fires on the boundary does not immediately rerun.
pub fn until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    let next = (now.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();

    (next - now).to_std().unwrap_or_default()
}

/// Start the sweep loop. Returns a CancellationToken that stops it.
pub fn start(pool: PgPool) -> CancellationToken {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            info!("overdue debt sweep scheduled");
            loop {
                let wait = until_next_utc_midnight(Utc::now());
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("overdue debt sweep stopped");
                        break;
                    }
                    _ = tokio::time::sleep(wait) => {
                        let started = Instant::now();
                        match sweep_overdue(&pool).await {
                            Ok(0) => debug!("overdue sweep: nothing to update ({:?})", started.elapsed()),
                            Ok(n) => info!("overdue sweep: marked {n} debts overdue ({:?})", started.elapsed()),
                            Err(e) => error!("overdue sweep failed: {e}"),
                        }
                    }
                }
            }
        });
    }

    cancel
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn one_minute_before_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 23, 59, 0).unwrap();
        assert_eq!(until_next_utc_midnight(now), Duration::from_secs(60));
    }

    #[test]
    fn exactly_at_midnight_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        assert_eq!(
            until_next_utc_midnight(now),
            Duration::from_secs(24 * 60 * 60)
        );
    }

    #[test]
    fn crosses_month_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 8, 31, 12, 0, 0).unwrap();
        let wait = until_next_utc_midnight(now);
        assert_eq!(wait, Duration::from_secs(12 * 60 * 60));
    }
}
