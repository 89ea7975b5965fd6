use crate::{
    bot::commands::start::home_menu,
    core::{directory::DirectoryError, state::AppState},
    errors::MyError,
    util::user_key,
};
use log::debug;
use teloxide::{
    Bot,
    payloads::{AnswerCallbackQuerySetters, EditMessageReplyMarkupSetters},
    prelude::{CallbackQuery, Requester},
};

pub async fn handle_subscribe(
    bot: Bot,
    q: CallbackQuery,
    state: &AppState,
    group_id: &str,
) -> Result<(), MyError> {
    let id = user_key(&q.from);

    let (notice, keyboard) = {
        let mut dir = state.directory.lock().await;
        let notice = match dir.subscribe(id, group_id) {
            Ok(group) => format!("✅ Subscribed to {}", group.name()),
            Err(DirectoryError::AlreadySubscribed(_)) => {
                "You are already subscribed to this group.".to_string()
            }
            Err(DirectoryError::NoSuchGroup(_)) => "This group no longer exists.".to_string(),
            Err(e) => e.to_string(),
        };
        let (_, keyboard) = home_menu(&mut dir, id);
        (notice, keyboard)
    };
    debug!("Subscribe button {} for {}: {}", group_id, id, notice);

    bot.answer_callback_query(q.id).text(notice).await?;

    // Refresh the ticks on the menu the button came from.
    if let Some(message) = q.message {
        bot.edit_message_reply_markup(message.chat().id, message.id())
            .reply_markup(keyboard)
            .await
            .ok();
    }
    Ok(())
}

