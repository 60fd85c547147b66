use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::{finish, sender_of, BookingDialogue, BotHandler, HandlerResult};
use crate::bot::commands::Command;
use crate::flow::admin::{self, AdminInput};
use crate::flow::{booking, DialogueState};
use crate::utils::feedback::FeedbackType;
use crate::utils::logging::log_command_start;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: BookingDialogue,
    handler: BotHandler,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let sender = sender_of(user);
    let feedback = handler.feedback(bot, msg.chat.id);
    let ctx = handler.context();

    log_command_start(
        &format!("{cmd:?}").to_lowercase(),
        user.username.as_deref().unwrap_or("unknown"),
        sender.user_id,
        msg.chat.id.0,
        None,
    );

    match cmd {
        Command::Start => {
            let outcome = booking::handle_start(&ctx).await;
            finish(&feedback, &dialogue, "start", outcome).await?;
        }
        Command::Admin => {
            let outcome = admin::handle_command(&ctx, &sender).await;
            finish(&feedback, &dialogue, "admin", outcome).await?;
        }
        Command::Help => {
            feedback
                .send(FeedbackType::Info, &Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

/// Plain messages. Only the capture steps of either flow consume them.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: BookingDialogue,
    state: DialogueState,
    handler: BotHandler,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let sender = sender_of(user);

    if state.awaits_client_text() {
        let Some(text) = msg.text() else {
            return Ok(());
        };
        let step = state.name();
        log_command_start(step, user.username.as_deref().unwrap_or("unknown"), sender.user_id, msg.chat.id.0, None);

        let feedback = handler.feedback(bot, msg.chat.id);
        let ctx = handler.context();
        let outcome = booking::handle_text(&ctx, state, &sender, text).await;
        return finish(&feedback, &dialogue, step, outcome).await;
    }

    if state.awaits_admin_input() {
        let input = if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            AdminInput::Photo(photo.file.id.clone())
        } else if let Some(text) = msg.text() {
            AdminInput::Text(text.to_string())
        } else {
            return Ok(());
        };
        let step = state.name();
        log_command_start(step, user.username.as_deref().unwrap_or("unknown"), sender.user_id, msg.chat.id.0, None);

        let feedback = handler.feedback(bot, msg.chat.id);
        let ctx = handler.context();
        let outcome = admin::handle_input(&ctx, &sender, state, input).await;
        return finish(&feedback, &dialogue, step, outcome).await;
    }

    Ok(())
}
