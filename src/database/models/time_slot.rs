use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{BotError, Result};
use crate::utils::logging::log_database_operation;

/// Admin-curated time of day. Bookings store their own time string and never reference a slot.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: i64,
    pub time: String,
    pub is_active: bool,
}

impl TimeSlot {
    pub async fn list(pool: &SqlitePool, active_only: bool) -> Result<Vec<Self>> {
        let query = if active_only {
            "SELECT id, time, is_active FROM time_slots WHERE is_active = 1 ORDER BY time"
        } else {
            "SELECT id, time, is_active FROM time_slots ORDER BY time"
        };

        let slots = sqlx::query_as::<_, TimeSlot>(query)
            .fetch_all(pool)
            .await?;
        Ok(slots)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>> {
        let slot = sqlx::query_as::<_, TimeSlot>(
            "SELECT id, time, is_active FROM time_slots WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(slot)
    }

    /// Fails with [`BotError::DuplicateKey`] when `time` is already present.
    pub async fn create(pool: &SqlitePool, time: &str) -> Result<Self> {
        log_database_operation("INSERT", "time_slots", Some(time));
        let result = sqlx::query("INSERT INTO time_slots (time) VALUES (?)")
            .bind(time)
            .execute(pool)
            .await
            .map_err(|e| BotError::from_insert(e, format!("Time slot {time}")))?;

        Ok(TimeSlot {
            id: result.last_insert_rowid(),
            time: time.to_string(),
            is_active: true,
        })
    }

    pub async fn toggle(pool: &SqlitePool, id: i64) -> Result<()> {
        log_database_operation("TOGGLE", "time_slots", Some(&id.to_string()));
        sqlx::query("UPDATE time_slots SET is_active = NOT is_active WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
        log_database_operation("DELETE", "time_slots", Some(&id.to_string()));
        sqlx::query("DELETE FROM time_slots WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
