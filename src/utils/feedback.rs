use std::path::{Path, PathBuf};

use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};

use crate::error::BotError;
use crate::flow::{Delivery, Effect, Media, Reply};
use crate::utils::logging::{log_database_error, log_delivery_failure};
use crate::utils::markdown::escape_markdown;

/// Feedback types for one-line status messages
#[derive(Debug, Clone)]
pub enum FeedbackType {
    Error,
    Info,
}

impl FeedbackType {
    fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }
}

/// Carries out flow effects in one chat.
///
/// For button presses it also knows the pressed message (to edit or delete it)
/// and the callback query (which Telegram expects to be answered exactly once).
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
    logo: Option<PathBuf>,
    source: Option<MessageId>,
    callback_id: Option<String>,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            logo: None,
            source: None,
            callback_id: None,
        }
    }

    pub fn with_logo(mut self, path: &Path) -> Self {
        self.logo = Some(path.to_path_buf());
        self
    }

    pub fn for_callback(mut self, callback_id: String, source: Option<MessageId>) -> Self {
        self.callback_id = Some(callback_id);
        self.source = source;
        self
    }

    /// Send a one-line status message
    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        let formatted_message = format!("{} {}", feedback_type.emoji(), escape_markdown(message));

        self.bot
            .send_message(self.chat_id, formatted_message)
            .parse_mode(ParseMode::MarkdownV2)
            .await
    }

    /// Send error feedback
    pub async fn error(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Error, message).await
    }

    /// Reports a failed flow to the user. The conversation state is not touched.
    pub async fn failure(&self, operation: &str, err: &BotError) -> ResponseResult<()> {
        if err.is_recoverable() {
            self.error(&err.to_string()).await?;
        } else {
            log_database_error(operation, &err.to_string(), Some(&format!("chat {}", self.chat_id.0)));
            self.error("Something went wrong. Please try again.").await?;
        }
        if let Some(id) = &self.callback_id {
            self.bot.answer_callback_query(id.clone()).await?;
        }
        Ok(())
    }

    /// Performs `effects` in order, then the notifications.
    ///
    /// Notifications go out even when a reply fails, since the flow has
    /// already committed its writes. Their own failures are logged and dropped.
    pub async fn apply(&self, effects: Vec<Effect>) -> ResponseResult<()> {
        let (notifications, effects): (Vec<_>, Vec<_>) = effects
            .into_iter()
            .partition(|effect| matches!(effect, Effect::Notify { .. }));

        let rendered = self.render(effects).await;
        for effect in notifications {
            if let Effect::Notify { chat_id, text } = effect {
                self.notify(chat_id, text).await;
            }
        }
        rendered
    }

    async fn render(&self, effects: Vec<Effect>) -> ResponseResult<()> {
        let mut answered = false;

        for effect in effects {
            match effect {
                Effect::Reply(reply) => self.reply(reply).await?,
                Effect::Toast { text, alert } => {
                    if let Some(id) = &self.callback_id {
                        self.bot
                            .answer_callback_query(id.clone())
                            .text(text)
                            .show_alert(alert)
                            .await?;
                        answered = true;
                    }
                }
                Effect::Dismiss => self.delete_source().await,
                Effect::Notify { chat_id, text } => self.notify(chat_id, text).await,
            }
        }

        if let (Some(id), false) = (&self.callback_id, answered) {
            self.bot.answer_callback_query(id.clone()).await?;
        }
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> ResponseResult<()> {
        match (reply.delivery, self.source) {
            (Delivery::Edit, Some(message_id)) => {
                let mut request = self
                    .bot
                    .edit_message_text(self.chat_id, message_id, reply.text.clone())
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = reply.keyboard.clone() {
                    request = request.reply_markup(keyboard);
                }

                match request.await {
                    Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
                    Err(err) => {
                        // Photo messages have no text to edit
                        tracing::debug!("Edit failed ({}), sending a new message instead", err);
                        self.delete_source().await;
                        self.send_reply(reply).await
                    }
                }
            }
            (Delivery::Replace, Some(_)) => {
                self.delete_source().await;
                self.send_reply(reply).await
            }
            _ => self.send_reply(reply).await,
        }
    }

    async fn send_reply(&self, reply: Reply) -> ResponseResult<()> {
        let photo = match reply.media {
            Media::Photo(file_id) => Some(InputFile::file_id(file_id)),
            Media::Logo => self
                .logo
                .as_ref()
                .filter(|path| path.exists())
                .map(|path| InputFile::file(path.clone())),
            Media::None => None,
        };

        match photo {
            Some(photo) => {
                let mut request = self
                    .bot
                    .send_photo(self.chat_id, photo)
                    .caption(reply.text)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = reply.keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await?;
            }
            None => {
                let mut request = self
                    .bot
                    .send_message(self.chat_id, reply.text)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = reply.keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await?;
            }
        }
        Ok(())
    }

    async fn delete_source(&self) {
        if let Some(message_id) = self.source {
            if let Err(e) = self.bot.delete_message(self.chat_id, message_id).await {
                let err = BotError::from(e);
                tracing::warn!("Could not delete message {} in {}: {}", message_id.0, self.chat_id.0, err);
            }
        }
    }

    async fn notify(&self, chat_id: i64, text: String) {
        let result = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await;

        if let Err(e) = result {
            let failure = BotError::Delivery {
                chat_id,
                reason: e.to_string(),
            };
            log_delivery_failure(chat_id, &failure.to_string());
        }
    }
}
