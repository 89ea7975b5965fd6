use crate::{
    bot::{
        commands::publish::reply_transition,
        replies::{dispatch_report_text, workflow_error_text},
    },
    core::{
        state::AppState,
        workflow::{Transition, WorkflowError},
    },
    errors::MyError,
    util::user_key,
};
use log::info;
use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::{CallbackQuery, ChatId, Requester},
    types::ParseMode,
};

pub async fn handle_select_group(
    bot: Bot,
    q: CallbackQuery,
    state: &AppState,
    group_id: &str,
) -> Result<(), MyError> {
    let id = user_key(&q.from);
    let result = {
        let mut dir = state.directory.lock().await;
        state
            .workflow
            .select_group(&mut dir, &state.timer, id, group_id)
    };
    finish_step(&bot, q, result).await
}

pub async fn handle_edit(bot: Bot, q: CallbackQuery, state: &AppState) -> Result<(), MyError> {
    let id = user_key(&q.from);
    let result = {
        let mut dir = state.directory.lock().await;
        state.workflow.edit(&mut dir, &state.timer, id)
    };
    finish_step(&bot, q, result).await
}

pub async fn handle_cancel(bot: Bot, q: CallbackQuery, state: &AppState) -> Result<(), MyError> {
    let id = user_key(&q.from);
    let result = {
        let mut dir = state.directory.lock().await;
        state.workflow.cancel(&mut dir, &state.timer, id)
    };
    finish_step(&bot, q, result).await
}

/// Sends the confirmed broadcast. Publish mode is already closed by the time
/// delivery starts; the admin gets the delivery counts at the end.
pub async fn handle_confirm(bot: Bot, q: CallbackQuery, state: &AppState) -> Result<(), MyError> {
    let id = user_key(&q.from);
    let result = {
        let mut dir = state.directory.lock().await;
        state.workflow.confirm(&mut dir, &state.timer, id)
    };

    let broadcast = match result {
        Ok(broadcast) => broadcast,
        Err(e) => {
            bot.answer_callback_query(q.id).await?;
            bot.send_message(ChatId(id), workflow_error_text(&e))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    };

    bot.answer_callback_query(q.id.clone()).await?;
    clear_buttons(&bot, &q).await;

    let report = state.broadcaster.dispatch(&bot, &broadcast).await;
    info!(
        "Broadcast by {} to '{}': {} sent, {} failed",
        id,
        broadcast.target.id(),
        report.sent,
        report.failed
    );

    bot.send_message(ChatId(id), dispatch_report_text(broadcast.target.name(), &report))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn finish_step(
    bot: &Bot,
    q: CallbackQuery,
    result: Result<Transition, WorkflowError>,
) -> Result<(), MyError> {
    bot.answer_callback_query(q.id.clone()).await?;
    if result.is_ok() {
        clear_buttons(bot, &q).await;
    }
    reply_transition(bot, ChatId(user_key(&q.from)), result).await
}

/// Removes the keyboard from the message whose button was pressed so an old
/// menu cannot be used twice.
async fn clear_buttons(bot: &Bot, q: &CallbackQuery) {
    if let Some(message) = &q.message {
        bot.edit_message_reply_markup(message.chat().id, message.id())
            .await
            .ok();
    }
}
