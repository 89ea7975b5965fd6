use crate::{
    bot::commands::{
        consultation::consultation_handler,
        groups::create_group_handler,
        help::help_handler,
        publish::{publish_handler, stop_handler},
        roles::role_handler,
        start::{home_handler, start_handler},
    },
    core::{
        directory::{Conversation, Role},
        state::AppState,
    },
    errors::MyError,
    util::enums::Command,
};
use log::debug;
use std::sync::Arc;
use teloxide::{Bot, prelude::Message};

pub async fn command_handlers(
    bot: Bot,
    message: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> Result<(), MyError> {
    // A command always abandons whatever multi-step input was pending.
    let abandoned = state
        .directory
        .lock()
        .await
        .take_conversation(message.chat.id.0);
    if abandoned != Conversation::None {
        debug!("Chat {} dropped pending step {:?}", message.chat.id, abandoned);
    }

    match cmd {
        Command::Start(arg) => start_handler(bot, message, &state, arg).await,
        Command::Home => home_handler(bot, message, &state).await,
        Command::Consultation => consultation_handler(bot, message, &state).await,
        Command::Help => help_handler(bot, message, &state).await,
        Command::Admin(secret) => role_handler(bot, message, &state, Role::Admin, secret).await,
        Command::Superadmin(secret) => {
            role_handler(bot, message, &state, Role::Superadmin, secret).await
        }
        Command::Publish => publish_handler(bot, message, &state).await,
        Command::Stop => stop_handler(bot, message, &state).await,
        Command::CreateGroup => create_group_handler(bot, message, &state).await,
    }
}
