use crate::{
    bot::{
        commands::{
            consultation::receive_consultation,
            groups::{receive_group_id, receive_group_name},
            publish::reply_transition,
            roles::apply_secret,
        },
        replies::{TRANSCRIPTION_DISABLED, UNKNOWN_COMMAND},
    },
    core::{
        directory::Conversation, services::transcription::transcription_handler, state::AppState,
        workflow::PublishState,
    },
    errors::MyError,
    util::log_preview,
};
use log::{debug, error};
use std::sync::Arc;
use teloxide::{
    Bot,
    requests::Requester,
    types::{Me, Message},
};

/// Plain text. A pending conversation step wins, then publish mode; anything
/// else gets a pointer to /help. Mistyped commands are answered and never
/// consumed as input.
pub async fn handle_text(
    bot: Bot,
    message: Message,
    text: String,
    state: Arc<AppState>,
    me: Me,
) -> Result<(), MyError> {
    if looks_like_command(&text) {
        debug!("Unknown command from {}: {}", message.chat.id, log_preview(&text));
        bot.send_message(message.chat.id, UNKNOWN_COMMAND).await?;
        return Ok(());
    }

    let id = message.chat.id.0;
    let (conversation, publishing) = {
        let mut dir = state.directory.lock().await;
        dir.register_or_get(id);
        let conversation = dir.take_conversation(id);
        let publishing = state.workflow.state(&dir, id) != PublishState::Idle;
        (conversation, publishing)
    };
    debug!("Text from {} ({:?}): {}", id, conversation, log_preview(&text));

    match conversation {
        Conversation::AwaitingSecret(role) => {
            bot.delete_message(message.chat.id, message.id).await.ok();
            apply_secret(&bot, &state, id, role, &text).await
        }
        Conversation::AwaitingGroupName => receive_group_name(&bot, &state, id, &text).await,
        Conversation::AwaitingGroupId { name } => {
            receive_group_id(&bot, &state, &me, id, name, &text).await
        }
        Conversation::AwaitingConsultation => receive_consultation(&bot, &state, id, &text).await,
        Conversation::None if publishing => {
            let result = {
                let mut dir = state.directory.lock().await;
                state.workflow.submit_text(&mut dir, &state.timer, id, &text)
            };
            reply_transition(&bot, message.chat.id, result).await
        }
        Conversation::None => {
            bot.send_message(
                message.chat.id,
                "Use /home to manage subscriptions or /help to see all commands.",
            )
            .await?;
            Ok(())
        }
    }
}

/// Voice and audio messages go to the transcription service in the
/// background so the dispatcher is not held up by the upload.
pub async fn handle_speech(bot: Bot, message: Message, state: Arc<AppState>) -> Result<(), MyError> {
    if message.from.as_ref().is_some_and(|u| u.is_bot) {
        return Ok(());
    }

    if state.whisper.is_none() {
        bot.send_message(message.chat.id, TRANSCRIPTION_DISABLED)
            .await?;
        return Ok(());
    }

    tokio::spawn(async move {
        let Some(client) = state.whisper.as_ref() else {
            return;
        };
        if let Err(e) = transcription_handler(bot, message, client).await {
            error!("Sound handler failed: {:?}", e);
        }
    });
    Ok(())
}

/// Commands the dispatcher did not recognise arrive here as plain text.
fn looks_like_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}
