pub mod callback;
pub mod message;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler},
    prelude::*,
};

use crate::config::AdminSet;
use crate::database::connection::DatabaseManager;
use crate::error::Result;
use crate::flow::{DialogueState, FlowContext, Sender, Transition};
use crate::utils::feedback::CommandFeedback;

pub type BookingDialogue = Dialogue<DialogueState, InMemStorage<DialogueState>>;
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Shared state of every update endpoint.
#[derive(Clone)]
pub struct BotHandler {
    pub db: DatabaseManager,
    pub admins: Arc<AdminSet>,
    pub logo_path: Arc<PathBuf>,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, admins: AdminSet, logo_path: PathBuf) -> Self {
        Self {
            db,
            admins: Arc::new(admins),
            logo_path: Arc::new(logo_path),
        }
    }

    /// Flow context stamped with the current local time.
    pub fn context(&self) -> FlowContext<'_> {
        FlowContext::new(&self.db.pool, &self.admins, Local::now().naive_local())
    }

    pub fn feedback(&self, bot: Bot, chat_id: ChatId) -> CommandFeedback {
        CommandFeedback::new(bot, chat_id).with_logo(&self.logo_path)
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let commands = self.clone();
        let messages = self.clone();
        let callbacks = self.clone();

        dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(
                        move |bot: Bot, msg: Message, cmd: crate::bot::commands::Command, dialogue: BookingDialogue| {
                            let handler = commands.clone();
                            async move { message::command_handler(bot, msg, cmd, dialogue, handler).await }
                        },
                    ),
            )
            .branch(Update::filter_message().endpoint(
                move |bot: Bot, msg: Message, dialogue: BookingDialogue, state: DialogueState| {
                    let handler = messages.clone();
                    async move { message::message_handler(bot, msg, dialogue, state, handler).await }
                },
            ))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: BookingDialogue, state: DialogueState| {
                    let handler = callbacks.clone();
                    async move { callback::callback_handler(bot, q, dialogue, state, handler).await }
                },
            ))
    }
}

/// Identity of a Telegram user as the flows see it.
pub fn sender_of(user: &teloxide::types::User) -> Sender {
    Sender::new(user.id.0, user.username.clone())
}

/// Stores the next state and performs the effects, or reports the failure.
pub async fn finish(
    feedback: &CommandFeedback,
    dialogue: &BookingDialogue,
    operation: &str,
    outcome: Result<Transition>,
) -> HandlerResult {
    match outcome {
        Ok(transition) => {
            if let Some(state) = transition.state {
                dialogue.update(state).await?;
            }
            feedback.apply(transition.effects).await?;
        }
        Err(err) => feedback.failure(operation, &err).await?,
    }
    Ok(())
}
