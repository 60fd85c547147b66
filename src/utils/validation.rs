use crate::error::{BotError, Result};

/// Longest specialist id that still fits every callback token under Telegram's 64-byte limit.
pub const MAX_SPECIALIST_ID_LEN: usize = 32;

/// Strict 24-hour `HH:MM`, zero padded. Returns the canonical string.
pub fn parse_slot_time(input: &str) -> Result<String> {
    let input = input.trim();
    let invalid = || BotError::Validation(format!("'{input}' is not a HH:MM time"));

    let (hours, minutes) = input.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    Ok(format!("{hour:02}:{minute:02}"))
}

/// Lower-cases, trims and replaces spaces with underscores.
pub fn normalize_specialist_id(input: &str) -> Result<String> {
    let id = input.trim().to_lowercase().replace(' ', "_");

    if id.is_empty() {
        return Err(BotError::Validation("Specialist ID cannot be empty".to_string()));
    }
    if id.len() > MAX_SPECIALIST_ID_LEN {
        return Err(BotError::Validation(format!(
            "Specialist ID cannot be longer than {MAX_SPECIALIST_ID_LEN} bytes"
        )));
    }

    Ok(id)
}

/// Description input where a lone `-` means "leave empty".
pub fn description_input(input: &str) -> String {
    let input = input.trim();
    if input == "-" {
        String::new()
    } else {
        input.to_string()
    }
}
