use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::database::models::{Specialist, TimeSlot};
use crate::utils::logging::log_system_event;

/// Columns added after the first release; older database files lack them.
const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[
    ("specialists", "photo_file_id", "TEXT"),
    ("bookings", "booking_type", "TEXT DEFAULT 'scheduled'"),
];

const DEFAULT_SLOTS: [&str; 12] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00",
    "15:00", "16:00", "17:00", "18:00", "19:00", "20:00",
];

#[derive(Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

/// What [`DatabaseManager::seed_defaults`] inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub specialists: usize,
    pub time_slots: usize,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_parent_dir(database_url)?;

        // Bookings may outlive their specialist, so foreign keys stay unenforced.
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Idempotent: safe on a fresh file, an up-to-date file, or one written by an older release.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;

        for (table, column, definition) in ADDITIVE_COLUMNS {
            if !self.column_exists(table, column).await? {
                info!("Adding missing column {}.{}", table, column);
                let ddl = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
                sqlx::query(&ddl).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    /// Inserts the default specialists and hourly slots into empty tables.
    pub async fn seed_defaults(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        if Specialist::list(&self.pool, false).await?.is_empty() {
            for (id, name, description) in default_specialists() {
                Specialist::create(&self.pool, id, name, description, None).await?;
                report.specialists += 1;
            }
        }

        if TimeSlot::list(&self.pool, false).await?.is_empty() {
            for time in DEFAULT_SLOTS {
                TimeSlot::create(&self.pool, time).await?;
                report.time_slots += 1;
            }
        }

        if report != SeedReport::default() {
            log_system_event(
                "Seeded defaults",
                Some(&format!("{} specialists, {} time slots", report.specialists, report.time_slots)),
            );
        }
        Ok(report)
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?"
        )
        .bind(table)
        .bind(column)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

/// Creates the directory holding a file-backed SQLite database.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn default_specialists() -> [(&'static str, &'static str, &'static str); 3] {
    [
        (
            "anna",
            "Anna Ivanova",
            "👩‍⚕️ Psychologist · 10 years of practice\n\n✨ Focus:\n• Anxiety and stress\n• Depression\n• Relationships and family",
        ),
        (
            "sergey",
            "Sergey Petrov",
            "👨‍💼 Coach · Business consultant\n\n✨ Helps with:\n• Reaching goals\n• Scaling a business\n• Getting through a crisis",
        ),
        (
            "maria",
            "Maria Sidorova",
            "👩‍🔬 Nutritionist · Dietitian\n\n✨ Works on:\n• Weight loss\n• Muscle gain\n• Eating habits",
        ),
    ]
}
