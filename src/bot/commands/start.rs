use crate::{
    bot::{keyboards::groups::subscription_keyboard, replies::directory_error_text},
    core::{
        directory::{Directory, DirectoryError, UserId},
        state::AppState,
    },
    errors::MyError,
    util::contact_of,
};
use log::info;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardMarkup, ParseMode},
    utils::html,
};

pub async fn start_handler(
    bot: Bot,
    message: Message,
    state: &AppState,
    arg: String,
) -> Result<(), MyError> {
    let id = message.chat.id.0;
    let contact = message.from.as_ref().and_then(contact_of);
    let group_id = arg.trim();

    let (text, keyboard) = {
        let mut dir = state.directory.lock().await;
        let (user, is_new_user) = dir.register_or_get(id);
        if contact.is_some() {
            user.contact = contact;
        }
        if is_new_user {
            info!("New subscriber {}", id);
        }

        let (mut text, keyboard) = home_menu(&mut dir, id);
        if group_id.is_empty() {
            let greeting = if is_new_user {
                "<b>Welcome!</b> 👋\n\nYou are subscribed to the news.\n\n"
            } else {
                "<b>Welcome back!</b>\n\n"
            };
            text.insert_str(0, greeting);
        } else {
            text = subscribe_text(&mut dir, id, group_id);
        }
        (text, keyboard)
    };

    let reply = bot
        .send_message(message.chat.id, text)
        .parse_mode(ParseMode::Html);
    if group_id.is_empty() {
        reply.reply_markup(keyboard).await?;
    } else {
        reply.await?;
    }
    Ok(())
}

pub async fn home_handler(bot: Bot, message: Message, state: &AppState) -> Result<(), MyError> {
    let (text, keyboard) = home_menu(&mut *state.directory.lock().await, message.chat.id.0);

    bot.send_message(message.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Public subscription menu for `id`. Private groups never show up here.
pub fn home_menu(dir: &mut Directory, id: UserId) -> (String, InlineKeyboardMarkup) {
    let user = dir.register_or_get(id).0.clone();
    let keyboard = subscription_keyboard(&dir.public_groups(), &user);
    (
        "🏠 <b>Subscriptions</b>\n\nTap a group to subscribe. ✅ marks the ones you already follow."
            .to_string(),
        keyboard,
    )
}

/// Subscribes through a direct `/start <group_id>` link.
pub fn subscribe_text(dir: &mut Directory, id: UserId, group_id: &str) -> String {
    match dir.subscribe(id, group_id) {
        Ok(group) => format!(
            "✅ You are now subscribed to <b>{}</b>.",
            html::escape(group.name())
        ),
        Err(DirectoryError::AlreadySubscribed(_)) => {
            let name = dir.group(group_id).map_or(group_id, |g| g.name());
            format!("You are already subscribed to <b>{}</b>.", html::escape(name))
        }
        Err(e) => directory_error_text(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::Secrets;

    fn directory() -> Directory {
        let mut dir = Directory::new(Secrets {
            admin: "a".into(),
            superadmin: "s".into(),
        });
        dir.create_group("VIP", "vip_private").unwrap();
        dir
    }

    #[test]
    fn direct_link_subscribes_to_private_group() {
        let mut dir = directory();
        assert_eq!(
            subscribe_text(&mut dir, 10, "vip_private"),
            "✅ You are now subscribed to <b>VIP</b>."
        );
        assert!(dir.user(10).unwrap().is_subscribed("vip_private"));
        assert_eq!(
            subscribe_text(&mut dir, 10, "vip_private"),
            "You are already subscribed to <b>VIP</b>."
        );
    }

    #[test]
    fn unknown_link_is_reported() {
        let mut dir = directory();
        assert!(subscribe_text(&mut dir, 10, "nope").contains("There is no group"));
    }
}
