/// Rendering flow effects onto Telegram
pub mod feedback;
/// Structured log helpers
pub mod logging;
/// MarkdownV2 escaping
pub mod markdown;
/// Date and time helpers
pub mod datetime;
/// Input validation
pub mod validation;
