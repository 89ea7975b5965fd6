use crate::core::directory::UserId;
use teloxide::types::User;

pub mod enums;

/// Telegram's limit for one text message, counted in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Directory key of a Telegram user. In private chats it equals the chat id,
/// so broadcasts can be sent straight to it.
pub fn user_key(user: &User) -> UserId {
    user.id.0 as UserId
}

/// `@username` when the user has one.
pub fn contact_of(user: &User) -> Option<String> {
    user.username.as_ref().map(|name| format!("@{}", name))
}

/// Shortens free text for single-line log output.
pub fn log_preview(text: &str) -> String {
    const MAX_PREVIEW: usize = 60;
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() > MAX_PREVIEW {
        let cut: String = flat.chars().take(MAX_PREVIEW).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}
