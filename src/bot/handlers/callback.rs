use teloxide::prelude::*;

use super::{finish, sender_of, BookingDialogue, BotHandler, HandlerResult};
use crate::flow::{admin, booking, Action, DialogueState, Effect};
use crate::utils::logging::{log_command_error, log_command_start};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    state: DialogueState,
    handler: BotHandler,
) -> HandlerResult {
    let sender = sender_of(&q.from);
    let username = q.from.username.as_deref().unwrap_or("unknown");

    let Some(message) = q.message.as_ref() else {
        // Inline-mode callbacks have no chat to answer in
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;
    let feedback = handler
        .feedback(bot, chat_id)
        .for_callback(q.id.clone(), Some(message.id));

    let data = q.data.as_deref().unwrap_or_default();
    log_command_start("callback", username, sender.user_id, chat_id.0, Some(data));

    let action = match data.parse::<Action>() {
        Ok(action) => action,
        Err(e) => {
            log_command_error("callback", sender.user_id, chat_id.0, &e.to_string());
            feedback
                .apply(vec![Effect::Toast {
                    text: "This button is no longer valid".to_string(),
                    alert: false,
                }])
                .await?;
            return Ok(());
        }
    };

    let ctx = handler.context();
    let outcome = match action {
        Action::Ignore => return Ok(feedback.apply(Vec::new()).await?),
        Action::Client(action) => booking::handle_action(&ctx, action).await,
        Action::Admin(action) => admin::handle_action(&ctx, &sender, state, action).await,
    };

    finish(&feedback, &dialogue, data, outcome).await
}
