use crate::{bot::replies::help_text, core::state::AppState, errors::MyError};
use teloxide::{prelude::*, types::ParseMode};

pub async fn help_handler(bot: Bot, message: Message, state: &AppState) -> Result<(), MyError> {
    let role = state.directory.lock().await.role_of(message.chat.id.0);
    bot.send_message(message.chat.id, help_text(role))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
