use sqlx::SqlitePool;

use crate::error::Result;
use crate::utils::logging::log_database_operation;

/// Free-form key/value settings with upsert semantics.
pub struct Setting;

impl Setting {
    pub async fn get(pool: &SqlitePool, key: &str, default: &str) -> Result<String> {
        let value = sqlx::query_scalar::<_, Option<String>>(
            "SELECT value FROM settings WHERE key = ?"
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(value.flatten().unwrap_or_else(|| default.to_string()))
    }

    pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
        log_database_operation("UPSERT", "settings", Some(key));
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }
}
