/// Slash commands understood by the bot
pub mod commands;
/// Dispatcher schema and update endpoints
pub mod handlers;
