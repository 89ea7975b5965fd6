use crate::{
    bot::{
        callbacks::{
            publish::{handle_cancel, handle_confirm, handle_edit, handle_select_group},
            subscribe::handle_subscribe,
        },
        keyboards::{
            groups::{SELECT_GROUP_PREFIX, SUBSCRIBE_PREFIX},
            publish::{CANCEL_MESSAGE, CONFIRM_SEND, EDIT_MESSAGE},
        },
    },
    core::state::AppState,
    errors::MyError,
};
use log::warn;
use std::sync::Arc;
use teloxide::{
    Bot,
    prelude::{CallbackQuery, Requester},
};

pub mod publish;
pub mod subscribe;

#[derive(Debug, PartialEq, Eq)]
enum CallbackAction<'a> {
    Subscribe { group_id: &'a str },
    SelectGroup { group_id: &'a str },
    ConfirmSend,
    EditMessage,
    CancelMessage,
}

fn parse_callback_data(data: &str) -> Option<CallbackAction<'_>> {
    match data {
        CONFIRM_SEND => return Some(CallbackAction::ConfirmSend),
        EDIT_MESSAGE => return Some(CallbackAction::EditMessage),
        CANCEL_MESSAGE => return Some(CallbackAction::CancelMessage),
        _ => {}
    }

    if let Some(group_id) = data.strip_prefix(SELECT_GROUP_PREFIX)
        && !group_id.is_empty()
    {
        return Some(CallbackAction::SelectGroup { group_id });
    }

    if let Some(group_id) = data.strip_prefix(SUBSCRIBE_PREFIX)
        && !group_id.is_empty()
    {
        return Some(CallbackAction::Subscribe { group_id });
    }

    None
}

pub async fn callback_query_handlers(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> Result<(), MyError> {
    let Some(data) = q.data.clone() else {
        return Ok(());
    };

    match parse_callback_data(&data) {
        Some(CallbackAction::Subscribe { group_id }) => {
            handle_subscribe(bot, q, &state, group_id).await?
        }
        Some(CallbackAction::SelectGroup { group_id }) => {
            handle_select_group(bot, q, &state, group_id).await?
        }
        Some(CallbackAction::ConfirmSend) => handle_confirm(bot, q, &state).await?,
        Some(CallbackAction::EditMessage) => handle_edit(bot, q, &state).await?,
        Some(CallbackAction::CancelMessage) => handle_cancel(bot, q, &state).await?,
        None => {
            warn!("Unhandled callback query data: {}", data);
            bot.answer_callback_query(q.id).await?;
        }
    }

    Ok(())
}
