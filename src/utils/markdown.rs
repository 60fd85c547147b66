//! Utility functions for handling Telegram MarkdownV2 formatting
//!
//! MarkdownV2 requires escaping of special characters to prevent formatting issues.
//! Every screen the bot renders is assembled from these helpers.

/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// This function escapes all characters that have special meaning in Telegram's
/// MarkdownV2 format to ensure they are displayed as literal text.
///
/// # Arguments
/// * `text` - The text to escape
///
/// # Returns
/// A string with all markdown special characters escaped with backslashes
///
/// # Example
/// ```
/// use session_booking_bot::utils::markdown::escape_markdown;
///
/// let text = "Phone: +7 (999) 000-00-00";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Phone: \\+7 \\(999\\) 000\\-00\\-00");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}' | '.' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escaped text wrapped in bold markers.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

/// Escaped text wrapped in italic markers.
pub fn italic(text: &str) -> String {
    format!("_{}_", escape_markdown(text))
}
