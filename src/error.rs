use thiserror::Error;

/// Errors produced by the store and the conversation flows.
#[derive(Error, Debug)]
pub enum BotError {
    /// A lookup missed (specialist, booking, time slot).
    #[error("{0} not found")]
    NotFound(String),

    /// A unique key already exists (specialist id, time slot value).
    #[error("{0} already exists")]
    DuplicateKey(String),

    /// User input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Caller is not on the admin allow-list.
    #[error("Permission denied")]
    PermissionDenied,

    /// A best-effort notification could not be delivered.
    #[error("Delivery to {chat_id} failed: {reason}")]
    Delivery {
        /// Recipient chat.
        chat_id: i64,
        /// Transport error text.
        reason: String,
    },

    /// SQLite error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Telegram API error.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BotError>;

impl BotError {
    /// Maps a unique-constraint violation onto [`BotError::DuplicateKey`],
    /// passing every other database error through.
    pub fn from_insert(err: sqlx::Error, key: impl Into<String>) -> Self {
        if is_unique_violation(&err) {
            BotError::DuplicateKey(key.into())
        } else {
            BotError::Database(err)
        }
    }

    /// Errors the flows recover from locally with a corrective message.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BotError::NotFound(_) | BotError::DuplicateKey(_) | BotError::Validation(_)
        )
    }
}

// SQLITE_CONSTRAINT_PRIMARYKEY = 1555, SQLITE_CONSTRAINT_UNIQUE = 2067
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let by_code = db_err
                .code()
                .map(|code| code == "1555" || code == "2067")
                .unwrap_or(false);
            by_code || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = BotError::from_insert(sqlx::Error::RowNotFound, "anna");
        assert!(matches!(err, BotError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(BotError::NotFound("Specialist".into()).is_recoverable());
        assert!(BotError::DuplicateKey("anna".into()).is_recoverable());
        assert!(BotError::Validation("bad time".into()).is_recoverable());
        assert!(!BotError::PermissionDenied.is_recoverable());
        assert!(!BotError::Database(sqlx::Error::PoolClosed).is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(BotError::NotFound("Booking".into()).to_string(), "Booking not found");
        assert_eq!(BotError::DuplicateKey("09:00".into()).to_string(), "09:00 already exists");
    }
}
