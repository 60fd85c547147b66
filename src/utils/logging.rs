use tracing::{debug, error, info, warn};

/// Logs an inbound command or button press with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        None => info!(
            "CMD_START: {} by {}({}) in chat {}",
            command, user, user_id, chat_id
        ),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user_id: u64, chat_id: i64, error: &str) {
    error!(
        "CMD_ERROR: {} by {} in chat {} - {}",
        command, user_id, chat_id, error
    );
}

/// Logs validation errors with consistent format
pub fn log_validation_error(step: &str, value: &str, error: &str, user_id: u64) {
    warn!(
        "VALIDATION_ERROR: {} - value '{}' invalid: {} - user {}",
        step, value, error, user_id
    );
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} failed: {} - {}", operation, error, d),
        None => error!("DB_ERROR: {} failed: {}", operation, error),
    }
}

/// Logs a non-admin touching the admin panel
pub fn log_permission_denied(action: &str, user_id: u64) {
    warn!("PERMISSION_DENIED: {} by {}", action, user_id);
}

/// Logs a swallowed send failure
pub fn log_delivery_failure(chat_id: i64, reason: &str) {
    warn!("DELIVERY_FAILED: chat {} - {}", chat_id, reason);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
