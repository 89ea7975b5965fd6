use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CONFIRM_SEND: &str = "confirm_send";
pub const EDIT_MESSAGE: &str = "edit_message";
pub const CANCEL_MESSAGE: &str = "cancel_message";

pub fn confirmation_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("✅ Send", CONFIRM_SEND)],
        vec![
            InlineKeyboardButton::callback("✏️ Edit", EDIT_MESSAGE),
            InlineKeyboardButton::callback("🚫 Cancel", CANCEL_MESSAGE),
        ],
    ])
}
