use crate::{bot::replies::forced_exit_text, core::{state::AppState, timer::Expiry}};
use log::{error, info};
use std::sync::Arc;
use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::{ChatId, Requester},
    types::ParseMode,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Consumes publish-mode deadlines and throws idle admins out of publish mode.
pub async fn run_expiry_loop(
    bot: Bot,
    state: Arc<AppState>,
    mut expiries: UnboundedReceiver<Expiry>,
) {
    while let Some(expiry) = expiries.recv().await {
        let exited = {
            let mut dir = state.directory.lock().await;
            state.workflow.force_exit(&mut dir, &state.timer, expiry)
        };
        if !exited {
            continue;
        }

        if let Err(e) = bot
            .send_message(
                ChatId(expiry.admin_id),
                forced_exit_text(state.timer.duration()),
            )
            .parse_mode(ParseMode::Html)
            .await
        {
            error!(
                "Failed to tell {} about the publish timeout: {:?}",
                expiry.admin_id, e
            );
        }
    }
    info!("Publish timer channel closed");
}
