use crate::{
    core::{
        directory::{Consultation, Conversation, UserId},
        state::AppState,
    },
    errors::MyError,
};
use chrono::Utc;
use log::{error, info};
use teloxide::{prelude::*, types::ParseMode, utils::html};

pub async fn consultation_handler(
    bot: Bot,
    message: Message,
    state: &AppState,
) -> Result<(), MyError> {
    state
        .directory
        .lock()
        .await
        .set_conversation(message.chat.id.0, Conversation::AwaitingConsultation);

    bot.send_message(
        message.chat.id,
        "💬 Describe your question in one message and our team will get back to you.",
    )
    .await?;
    Ok(())
}

/// Stores the request and forwards it to the operators' group.
pub async fn receive_consultation(
    bot: &Bot,
    state: &AppState,
    id: UserId,
    description: &str,
) -> Result<(), MyError> {
    let (consultation, contact) = {
        let mut dir = state.directory.lock().await;
        let consultation = dir.record_consultation(id, description, Utc::now());
        let contact = dir.user(id).and_then(|u| u.contact.clone());
        (consultation, contact)
    };
    info!("Consultation request from {}", id);

    let admin_group = state.config.get_admin_group_id();
    let forwarded = bot
        .send_message(admin_group, operator_report(id, contact.as_deref(), &consultation))
        .parse_mode(ParseMode::Html)
        .await;

    let reply = match forwarded {
        Ok(_) => "✅ Thank you! Our team will contact you soon.",
        Err(e) => {
            error!(
                "Failed to forward consultation from {} to {}: {:?}",
                id, admin_group, e
            );
            "Your request is saved, but the team could not be reached right now. We will get back to you."
        }
    };
    bot.send_message(ChatId(id), reply).await?;
    Ok(())
}

pub fn operator_report(id: UserId, contact: Option<&str>, consultation: &Consultation) -> String {
    let groups = if consultation.groups.is_empty() {
        "-".to_string()
    } else {
        consultation
            .groups
            .iter()
            .map(|g| html::escape(g))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "📩 <b>Consultation request</b>\n\n\
        <b>From:</b> <a href=\"tg://user?id={id}\">{id}</a> {contact}\n\
        <b>Groups:</b> {groups}\n\
        <b>Time:</b> {time}\n\n\
        <blockquote>{text}</blockquote>",
        id = id,
        contact = contact.map(html::escape).unwrap_or_else(|| "(no username)".to_string()),
        groups = groups,
        time = consultation.created_at.format("%Y-%m-%d %H:%M UTC"),
        text = html::escape(&consultation.description),
    )
}
