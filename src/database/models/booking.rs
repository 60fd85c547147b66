use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;

use crate::error::{BotError, Result};
use crate::utils::datetime::DATE_FORMAT;
use crate::utils::logging::log_database_operation;

/// Urgency class of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    #[sqlx(rename = "urgent_15")]
    #[serde(rename = "urgent_15")]
    Urgent15,
    #[sqlx(rename = "urgent_60")]
    #[serde(rename = "urgent_60")]
    Urgent60,
    #[sqlx(rename = "scheduled")]
    Scheduled,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Urgent15 => "urgent_15",
            BookingType::Urgent60 => "urgent_60",
            BookingType::Scheduled => "scheduled",
        }
    }

    pub fn is_urgent(&self) -> bool {
        !matches!(self, BookingType::Scheduled)
    }

    /// Label used in admin notifications and booking details.
    pub fn label(&self) -> &'static str {
        match self {
            BookingType::Urgent15 => "🚨 URGENT (15 min)",
            BookingType::Urgent60 => "⏰ Within an hour",
            BookingType::Scheduled => "📅 Scheduled",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a booking. Cancellation is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of [`Booking::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub specialist_id: String,
    pub date: String,
    pub time: String,
    pub booking_type: BookingType,
    pub client_name: String,
    pub client_phone: String,
    pub client_username: Option<String>,
    pub client_user_id: i64,
}

/// A booking joined with its specialist's name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub specialist_id: String,
    pub specialist_name: String,
    pub date: String,
    pub time: String,
    pub booking_type: BookingType,
    pub client_name: String,
    pub client_phone: String,
    pub client_username: Option<String>,
    pub client_user_id: i64,
    pub status: BookingStatus,
    pub created_at: String,
}

/// Filters for [`Booking::list`]. The default lists up to 50 confirmed bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFilter {
    pub specialist_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub limit: i64,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            specialist_id: None,
            date_from: None,
            date_to: None,
            status: Some(BookingStatus::Confirmed),
            limit: 50,
        }
    }
}

impl BookingFilter {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }

    pub fn with_status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.specialist_id, s.name AS specialist_name, b.date, b.time,
           COALESCE(b.booking_type, 'scheduled') AS booking_type,
           COALESCE(b.client_name, '') AS client_name,
           COALESCE(b.client_phone, '') AS client_phone,
           b.client_username,
           COALESCE(b.client_user_id, 0) AS client_user_id,
           COALESCE(b.status, 'confirmed') AS status,
           COALESCE(CAST(b.created_at AS TEXT), '') AS created_at
    FROM bookings b
    JOIN specialists s ON b.specialist_id = s.id
"#;

impl Booking {
    /// True when no confirmed booking holds this exact specialist, date and time.
    pub async fn is_slot_available(
        pool: &SqlitePool,
        specialist_id: &str,
        date: &str,
        time: &str,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE specialist_id = ? AND date = ? AND time = ? AND status = 'confirmed'"
        )
        .bind(specialist_id)
        .bind(date)
        .bind(time)
        .fetch_one(pool)
        .await?;

        Ok(taken == 0)
    }

    /// Inserts unconditionally and returns the new id. Availability is not checked here.
    pub async fn create(pool: &SqlitePool, booking: &NewBooking) -> Result<i64> {
        log_database_operation(
            "INSERT",
            "bookings",
            Some(&format!("{} {} {}", booking.specialist_id, booking.date, booking.time)),
        );

        let result = sqlx::query(
            r#"
            INSERT INTO bookings
                (specialist_id, date, time, client_name, client_phone, client_username, client_user_id, booking_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&booking.specialist_id)
        .bind(&booking.date)
        .bind(&booking.time)
        .bind(&booking.client_name)
        .bind(&booking.client_phone)
        .bind(&booking.client_username)
        .bind(booking.client_user_id)
        .bind(booking.booking_type)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>> {
        let query = format!("{BOOKING_SELECT} WHERE b.id = ?");
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(booking)
    }

    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Self> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| BotError::NotFound(format!("Booking #{id}")))
    }

    /// Newest date and time first, capped at `filter.limit`.
    pub async fn list(pool: &SqlitePool, filter: &BookingFilter) -> Result<Vec<Self>> {
        let mut query = format!("{BOOKING_SELECT} WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(specialist_id) = &filter.specialist_id {
            query.push_str(" AND b.specialist_id = ?");
            params.push(specialist_id.clone());
        }
        if let Some(date_from) = filter.date_from {
            query.push_str(" AND b.date >= ?");
            params.push(date_from.format(DATE_FORMAT).to_string());
        }
        if let Some(date_to) = filter.date_to {
            query.push_str(" AND b.date <= ?");
            params.push(date_to.format(DATE_FORMAT).to_string());
        }
        if let Some(status) = filter.status {
            query.push_str(" AND b.status = ?");
            params.push(status.as_str().to_string());
        }
        query.push_str(" ORDER BY b.date DESC, b.time DESC LIMIT ?");

        let mut query_builder = sqlx::query_as::<_, Booking>(&query);
        for param in &params {
            query_builder = query_builder.bind(param);
        }

        let bookings = query_builder.bind(filter.limit).fetch_all(pool).await?;
        Ok(bookings)
    }

    /// Flips the status to cancelled regardless of its current value.
    pub async fn cancel(pool: &SqlitePool, id: i64) -> Result<()> {
        log_database_operation("CANCEL", "bookings", Some(&id.to_string()));
        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}
