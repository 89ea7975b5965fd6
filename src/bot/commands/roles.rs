use crate::{
    bot::replies::{directory_error_text, role_name},
    core::{
        directory::{Conversation, Role, UserId},
        state::AppState,
    },
    errors::MyError,
};
use log::{error, info};
use teloxide::{prelude::*, types::ParseMode, utils::html};

/// `/admin` and `/superadmin`. Without an argument the password is asked for
/// and taken from the next message.
pub async fn role_handler(
    bot: Bot,
    message: Message,
    state: &AppState,
    role: Role,
    secret: String,
) -> Result<(), MyError> {
    let id = message.chat.id.0;

    if secret.trim().is_empty() {
        state
            .directory
            .lock()
            .await
            .set_conversation(id, Conversation::AwaitingSecret(role));
        bot.send_message(
            message.chat.id,
            format!("🔑 Send the {} password.", role_name(role)),
        )
        .await?;
        return Ok(());
    }

    // Keep the password out of the chat history.
    bot.delete_message(message.chat.id, message.id).await.ok();
    apply_secret(&bot, state, id, role, &secret).await
}

pub async fn apply_secret(
    bot: &Bot,
    state: &AppState,
    id: UserId,
    role: Role,
    secret: &str,
) -> Result<(), MyError> {
    let (result, previous, contact, superadmins) = {
        let mut dir = state.directory.lock().await;
        let previous = dir.role_of(id);
        let result = match role {
            Role::Superadmin => dir.promote_to_superadmin(id, secret),
            _ => dir.promote_to_admin(id, secret),
        };
        let contact = dir.user(id).and_then(|u| u.contact.clone());
        (result, previous, contact, dir.superadmins())
    };

    let granted = match result {
        Ok(granted) => granted,
        Err(e) => {
            info!("User {} failed to get the {} role: {}", id, role_name(role), e);
            bot.send_message(ChatId(id), directory_error_text(&e))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    };

    bot.send_message(
        ChatId(id),
        format!(
            "✅ You are {} now. Send /help to see what you can do.",
            role_name(granted)
        ),
    )
    .await?;

    if granted == previous {
        return Ok(());
    }

    let notice = format!(
        "👤 New {}: <a href=\"tg://user?id={}\">{}</a>{}",
        role_name(granted),
        id,
        id,
        contact
            .map(|c| format!(" ({})", html::escape(&c)))
            .unwrap_or_default()
    );
    for superadmin in superadmins.into_iter().filter(|s| *s != id) {
        if let Err(e) = bot
            .send_message(ChatId(superadmin), notice.clone())
            .parse_mode(ParseMode::Html)
            .await
        {
            error!("Failed to notify superadmin {}: {:?}", superadmin, e);
        }
    }
    Ok(())
}
