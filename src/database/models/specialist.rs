use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{BotError, Result};
use crate::utils::logging::log_database_operation;

const SPECIALIST_COLUMNS: &str = "id, name, description, photo_file_id, is_active";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Specialist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub photo_file_id: Option<String>,
    pub is_active: bool,
}

impl Specialist {
    /// Active specialists by name, or everyone with active ones first.
    pub async fn list(pool: &SqlitePool, active_only: bool) -> Result<Vec<Self>> {
        let query = if active_only {
            format!("SELECT {SPECIALIST_COLUMNS} FROM specialists WHERE is_active = 1 ORDER BY name")
        } else {
            format!("SELECT {SPECIALIST_COLUMNS} FROM specialists ORDER BY is_active DESC, name")
        };

        let specialists = sqlx::query_as::<_, Specialist>(&query)
            .fetch_all(pool)
            .await?;
        Ok(specialists)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>> {
        let query = format!("SELECT {SPECIALIST_COLUMNS} FROM specialists WHERE id = ?");
        let specialist = sqlx::query_as::<_, Specialist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(specialist)
    }

    /// Like [`Specialist::find_by_id`] but a miss is [`BotError::NotFound`].
    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Self> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| BotError::NotFound(format!("Specialist '{id}'")))
    }

    pub async fn create(
        pool: &SqlitePool,
        id: &str,
        name: &str,
        description: &str,
        photo_file_id: Option<&str>,
    ) -> Result<Self> {
        log_database_operation("INSERT", "specialists", Some(id));
        sqlx::query(
            "INSERT INTO specialists (id, name, description, photo_file_id) VALUES (?, ?, ?, ?)"
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(photo_file_id)
        .execute(pool)
        .await
        .map_err(|e| BotError::from_insert(e, format!("Specialist '{id}'")))?;

        Self::get(pool, id).await
    }

    /// Partial update; `None` keeps the stored value.
    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self> {
        let current = Self::get(pool, id).await?;
        let name = name.unwrap_or(current.name.as_str());
        let description = description.or(current.description.as_deref());

        log_database_operation("UPDATE", "specialists", Some(id));
        sqlx::query("UPDATE specialists SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(pool)
            .await?;

        Self::get(pool, id).await
    }

    pub async fn set_photo(pool: &SqlitePool, id: &str, photo_file_id: &str) -> Result<()> {
        log_database_operation("UPDATE photo", "specialists", Some(id));
        sqlx::query("UPDATE specialists SET photo_file_id = ? WHERE id = ?")
            .bind(photo_file_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn toggle_active(pool: &SqlitePool, id: &str) -> Result<()> {
        log_database_operation("TOGGLE", "specialists", Some(id));
        sqlx::query("UPDATE specialists SET is_active = NOT is_active WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Hard delete. Bookings that reference the specialist are left in place.
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<()> {
        log_database_operation("DELETE", "specialists", Some(id));
        sqlx::query("DELETE FROM specialists WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Description for display, empty treated as missing.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}
