use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Session booking bot commands:")]
pub enum Command {
    #[command(description = "Book a session with a specialist")]
    Start,
    #[command(description = "Open the admin panel")]
    Admin,
    #[command(description = "Display this help message")]
    Help,
}
