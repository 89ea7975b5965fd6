use crate::{
    bot::{
        keyboards::groups::start_link,
        replies::{ADMINS_ONLY, directory_error_text},
    },
    core::{
        directory::{
            Conversation, DirectoryError, Role, UserId, is_private_id, is_valid_group_name,
        },
        state::AppState,
    },
    errors::MyError,
};
use teloxide::{prelude::*, types::{Me, ParseMode}, utils::html};

pub async fn create_group_handler(
    bot: Bot,
    message: Message,
    state: &AppState,
) -> Result<(), MyError> {
    let id = message.chat.id.0;
    let allowed = {
        let mut dir = state.directory.lock().await;
        let allowed = dir.is_admin(id);
        if allowed {
            dir.set_conversation(id, Conversation::AwaitingGroupName);
        }
        allowed
    };

    let text = if allowed {
        "🆕 Send the display name of the new group."
    } else {
        ADMINS_ONLY
    };
    bot.send_message(message.chat.id, text).await?;
    Ok(())
}

/// Second step: the display name arrived, ask for the id.
pub async fn receive_group_name(
    bot: &Bot,
    state: &AppState,
    id: UserId,
    name: &str,
) -> Result<(), MyError> {
    if !is_valid_group_name(name) {
        state
            .directory
            .lock()
            .await
            .set_conversation(id, Conversation::AwaitingGroupName);
        let notice = directory_error_text(&DirectoryError::InvalidGroupName(name.to_string()));
        bot.send_message(ChatId(id), notice).await?;
        return Ok(());
    }

    state.directory.lock().await.set_conversation(
        id,
        Conversation::AwaitingGroupId {
            name: name.trim().to_string(),
        },
    );
    bot.send_message(
        ChatId(id),
        "Now send the group id: Latin letters, digits and underscores only.\n\
        End it with <code>_private</code> to hide the group from /home.",
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

/// Last step: create the group and hand back its subscription link. A bad
/// id keeps the conversation on this step so another one can be sent.
pub async fn receive_group_id(
    bot: &Bot,
    state: &AppState,
    me: &Me,
    id: UserId,
    name: String,
    group_id: &str,
) -> Result<(), MyError> {
    let result = {
        let mut dir = state.directory.lock().await;
        if !dir.is_admin(id) {
            Err(DirectoryError::NotAuthorized(Role::Admin))
        } else {
            let result = dir.create_group(&name, group_id);
            if matches!(
                result,
                Err(DirectoryError::InvalidGroupId(_) | DirectoryError::GroupExists(_))
            ) {
                dir.set_conversation(id, Conversation::AwaitingGroupId { name });
            }
            result
        }
    };

    let text = match result {
        Ok(group) => {
            let visibility = if is_private_id(group.id()) {
                "Private: hidden from /home, reachable through the link only."
            } else {
                "Public: listed in /home."
            };
            format!(
                "✅ Group <b>{}</b> created.\n\nId: <code>{}</code>\nLink: {}\n{}",
                html::escape(group.name()),
                group.id(),
                start_link(me.username(), group.id()),
                visibility
            )
        }
        Err(e) => directory_error_text(&e),
    };

    bot.send_message(ChatId(id), text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
