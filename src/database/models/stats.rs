use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::Result;
use crate::utils::datetime::DATE_FORMAT;

/// Aggregate counters shown in the admin panel. Booking counts cover confirmed bookings only,
/// except `cancelled_bookings`.
#[derive(Debug, Clone, Copy, Default, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_bookings: i64,
    pub today_bookings: i64,
    pub upcoming_bookings: i64,
    pub cancelled_bookings: i64,
    pub active_specialists: i64,
}

impl Stats {
    /// Counts relative to `today`.
    pub async fn collect(pool: &SqlitePool, today: NaiveDate) -> Result<Self> {
        let today = today.format(DATE_FORMAT).to_string();

        let stats = sqlx::query_as::<_, Stats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bookings WHERE status = 'confirmed') AS total_bookings,
                (SELECT COUNT(*) FROM bookings WHERE date = ?1 AND status = 'confirmed') AS today_bookings,
                (SELECT COUNT(*) FROM bookings WHERE date >= ?1 AND status = 'confirmed') AS upcoming_bookings,
                (SELECT COUNT(*) FROM bookings WHERE status = 'cancelled') AS cancelled_bookings,
                (SELECT COUNT(*) FROM specialists WHERE is_active = 1) AS active_specialists
            "#,
        )
        .bind(&today)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }

    /// Counts relative to the local wall-clock date.
    pub async fn current(pool: &SqlitePool) -> Result<Self> {
        Self::collect(pool, Local::now().date_naive()).await
    }
}
