use crate::core::directory::{Group, UserRecord};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const SUBSCRIBE_PREFIX: &str = "subscribe_";
pub const SELECT_GROUP_PREFIX: &str = "select_group_";

/// Public groups, one per row. Groups the user already follows are ticked.
pub fn subscription_keyboard(groups: &[&Group], user: &UserRecord) -> InlineKeyboardMarkup {
    let rows = groups
        .iter()
        .map(|group| {
            let mark = if user.is_subscribed(group.id()) { "✅" } else { "➕" };
            vec![InlineKeyboardButton::callback(
                format!("{} {}", mark, group.name()),
                format!("{}{}", SUBSCRIBE_PREFIX, group.id()),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// The whole catalog as broadcast targets. Private groups are listed too.
pub fn target_keyboard(groups: &[Group]) -> InlineKeyboardMarkup {
    let rows = groups
        .iter()
        .map(|group| {
            let label = if group.is_private() {
                format!("🔒 {}", group.name())
            } else {
                group.name().to_string()
            };
            vec![InlineKeyboardButton::callback(
                label,
                format!("{}{}", SELECT_GROUP_PREFIX, group.id()),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Deep link that runs `/start <group_id>` for whoever opens it.
pub fn start_link(bot_username: &str, group_id: &str) -> String {
    format!("https://t.me/{}?start={}", bot_username, group_id)
}
