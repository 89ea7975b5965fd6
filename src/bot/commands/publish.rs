use crate::{
    bot::replies::{transition_reply, workflow_error_text},
    core::{
        state::AppState,
        workflow::{Transition, WorkflowError},
    },
    errors::MyError,
};
use log::debug;
use teloxide::{prelude::*, types::ParseMode};

pub async fn publish_handler(bot: Bot, message: Message, state: &AppState) -> Result<(), MyError> {
    let id = message.chat.id.0;
    let result = {
        let mut dir = state.directory.lock().await;
        dir.register_or_get(id);
        state.workflow.begin(&mut dir, &state.timer, id)
    };
    reply_transition(&bot, message.chat.id, result).await
}

pub async fn stop_handler(bot: Bot, message: Message, state: &AppState) -> Result<(), MyError> {
    let id = message.chat.id.0;
    let result = {
        let mut dir = state.directory.lock().await;
        state.workflow.stop(&mut dir, &state.timer, id)
    };
    reply_transition(&bot, message.chat.id, result).await
}

/// Renders a workflow step, or the notice explaining why it was refused.
pub async fn reply_transition(
    bot: &Bot,
    chat_id: ChatId,
    result: Result<Transition, WorkflowError>,
) -> Result<(), MyError> {
    let (text, keyboard) = match result {
        Ok(transition) => transition_reply(&transition),
        Err(e) => {
            debug!("Publish step refused for {}: {}", chat_id, e);
            (workflow_error_text(&e), None)
        }
    };

    let request = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
    match keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}
