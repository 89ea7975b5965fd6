//! User-facing texts. Everything here is HTML; user content is escaped.

use crate::{
    bot::keyboards::{groups::target_keyboard, publish::confirmation_keyboard},
    core::{
        directory::{DirectoryError, MAX_GROUP_NAME_LEN, Role},
        services::broadcast::DispatchReport,
        workflow::{PublishState, Transition, WorkflowError},
    },
};
use std::time::Duration;
use teloxide::{types::InlineKeyboardMarkup, utils::html};

pub const ADMINS_ONLY: &str = "⛔ This command is for admins only.";
pub const NOT_PUBLISHING: &str = "You are not currently publishing.";
pub const SOMETHING_WENT_WRONG: &str = "⚠️ Something went wrong. Please try again later.";
pub const TRANSCRIPTION_DISABLED: &str = "Voice transcription is not enabled on this bot.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help to see the available commands.";

pub fn directory_error_text(err: &DirectoryError) -> String {
    match err {
        DirectoryError::WrongSecret => "❌ Wrong password.".to_string(),
        DirectoryError::NotAuthorized(Role::Admin) => ADMINS_ONLY.to_string(),
        DirectoryError::NotAuthorized(role) => {
            format!("⛔ Only {} users can do that.", role_name(*role))
        }
        DirectoryError::InvalidGroupId(id) => format!(
            "❌ <code>{}</code> is not a valid group id. Use 1-48 Latin letters, digits or underscores.",
            html::escape(id)
        ),
        DirectoryError::InvalidGroupName(_) => format!(
            "❌ The group name must be 1-{} characters. Send another name.",
            MAX_GROUP_NAME_LEN
        ),
        DirectoryError::GroupExists(id) => format!(
            "❌ Group <code>{}</code> already exists. Send another id.",
            html::escape(id)
        ),
        DirectoryError::AlreadySubscribed(id) => format!(
            "You are already subscribed to <code>{}</code>.",
            html::escape(id)
        ),
        DirectoryError::NoSuchGroup(id) => {
            format!("There is no group <code>{}</code>.", html::escape(id))
        }
    }
}

pub fn workflow_error_text(err: &WorkflowError) -> String {
    match err {
        WorkflowError::NotAuthorized => ADMINS_ONLY.to_string(),
        WorkflowError::NotPublishing | WorkflowError::OutOfStep(PublishState::Idle) => {
            NOT_PUBLISHING.to_string()
        }
        WorkflowError::AlreadyPublishing => {
            "You are already in publish mode. Send /stop to leave it.".to_string()
        }
        WorkflowError::OutOfStep(PublishState::Composing) => {
            "Send the message text first.".to_string()
        }
        WorkflowError::OutOfStep(PublishState::ChoosingTarget) => {
            "Pick a target group from the list first.".to_string()
        }
        WorkflowError::OutOfStep(PublishState::Confirming) => {
            "Use the buttons under the preview: send, edit or cancel.".to_string()
        }
        WorkflowError::NoSuchGroup(id) => {
            format!("Group <code>{}</code> does not exist.", html::escape(id))
        }
        WorkflowError::MessageTooLong { len, max } => format!(
            "❌ The message is too long: {} characters, at most {} fit. Send a shorter text.",
            len, max
        ),
    }
}

pub fn transition_reply(transition: &Transition) -> (String, Option<InlineKeyboardMarkup>) {
    match transition {
        Transition::Started => (
            "📝 <b>Publish mode is on.</b>\n\nSend the text of the broadcast. /stop leaves publish mode."
                .to_string(),
            None,
        ),
        Transition::TargetsOffered { groups } => (
            "Who should receive it? Choose a group:".to_string(),
            Some(target_keyboard(groups)),
        ),
        Transition::AwaitingConfirmation { preview, target } => (
            format!(
                "<b>Preview</b>\n\n{}\n\n<b>Target:</b> {}",
                html::escape(preview),
                html::escape(target.name())
            ),
            Some(confirmation_keyboard()),
        ),
        Transition::EditRequested => ("✏️ Send the new text.".to_string(), None),
        Transition::Cancelled => (
            "🚫 Broadcast cancelled. Publish mode is off.".to_string(),
            None,
        ),
        Transition::Stopped => ("Publish mode is off.".to_string(), None),
    }
}

pub fn forced_exit_text(timeout: Duration) -> String {
    format!(
        "⌛ Publish mode was closed after {} without activity. The draft was discarded.",
        humanize(timeout)
    )
}

pub fn dispatch_report_text(target_name: &str, report: &DispatchReport) -> String {
    let mut text = format!(
        "✅ Broadcast to <b>{}</b> sent: {} delivered",
        html::escape(target_name),
        report.sent
    );
    if report.failed > 0 {
        text.push_str(&format!(", {} failed", report.failed));
    }
    text.push('.');
    text
}

pub fn help_text(role: Role) -> String {
    let mut text = String::from(
        "<b>Commands</b>\n\
        /start - subscribe to the news\n\
        /home - choose subscription groups\n\
        /consultation - ask our team for a consultation\n\
        /help - this message\n\n\
        Send a voice message to get its transcript.",
    );
    if role.is_admin() {
        text.push_str(
            "\n\n<b>Admin</b>\n\
            /publish - compose a broadcast\n\
            /stop - leave publish mode\n\
            /create_group - add a subscription group\n\
            Groups whose id ends with <code>_private</code> are hidden from /home.",
        );
    }
    if role.is_superadmin() {
        text.push_str("\n\nYou are a superadmin and get notified about new admins.");
    }
    text
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "regular",
        Role::Admin => "admin",
        Role::Superadmin => "superadmin",
    }
}

fn humanize(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    }
}
