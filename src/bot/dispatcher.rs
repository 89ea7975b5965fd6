use crate::{
    bot::{
        callbacks::callback_query_handlers,
        commander::command_handlers,
        messager::{handle_speech, handle_text},
        replies::{SOMETHING_WENT_WRONG, directory_error_text, workflow_error_text},
        timeouts::run_expiry_loop,
    },
    core::{config::Config, state::AppState},
    errors::MyError,
    util::enums::Command,
};
use log::{error, info};
use std::{convert::Infallible, ops::ControlFlow, sync::Arc};
use teloxide::{
    Bot,
    dispatching::{
        Dispatcher, DpHandlerDescription, HandlerExt, MessageFilterExt, UpdateFilterExt,
    },
    dptree,
    error_handlers::LoggingErrorHandler,
    payloads::SendMessageSetters,
    prelude::{Handler, Message, Requester},
    types::{Chat, Me, ParseMode, Update, User},
    update_listeners::Polling,
    utils::{command::BotCommands, html},
};

async fn root_handler(
    update: Update,
    state: Arc<AppState>,
    bot: Bot,
    logic: Arc<Handler<'static, Result<(), MyError>, DpHandlerDescription>>,
    me: Me,
) -> Result<(), Infallible> {
    let deps = dptree::deps![update.clone(), state.clone(), bot.clone(), me];
    let result = logic.dispatch(deps).await;

    if let ControlFlow::Break(Err(err)) = result {
        handle_error(Arc::new(err), update, state, bot).await;
    }

    Ok(())
}

pub fn logic_handlers() -> Handler<'static, Result<(), MyError>, DpHandlerDescription> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter(|message: Message| message.chat.is_private())
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(command_handlers),
                )
                .branch(Message::filter_voice().endpoint(handle_speech))
                .branch(Message::filter_audio().endpoint(handle_speech))
                .branch(Message::filter_text().endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_query_handlers))
}

async fn run_bot(state: Arc<AppState>) -> Result<(), MyError> {
    let bot = state.config.get_bot().clone();
    bot.set_my_commands(Command::bot_commands()).await?;

    let me = bot.get_me().await?;
    info!("Bot name: {:?}", me.username());

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot.clone(), dptree::endpoint(root_handler))
        .dependencies(dptree::deps![state, Arc::new(logic_handlers()), me])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(listener, LoggingErrorHandler::new())
        .await;

    Ok(())
}

pub async fn run() -> Result<(), MyError> {
    let config = Config::from_env()?;
    let (state, expiries) = AppState::new(config)?;
    let state = Arc::new(state);

    if state.whisper.is_none() {
        info!("OPENAI_API_KEY is not set, voice transcription is disabled");
    }

    let bot = state.config.get_bot().clone();
    tokio::spawn(run_expiry_loop(bot, state.clone(), expiries));
    run_bot(state).await
}

fn extract_info(update: &Update) -> (Option<&User>, Option<&Chat>) {
    match &update.kind {
        teloxide::types::UpdateKind::Message(m) => (m.from.as_ref(), Some(&m.chat)),
        teloxide::types::UpdateKind::CallbackQuery(q) => {
            (Some(&q.from), q.message.as_ref().map(|m| m.chat()))
        }
        _ => (None, None),
    }
}

/// What the user sees when a handler failed. Domain errors explain
/// themselves; anything else is a generic apology.
fn user_notice(err: &MyError) -> String {
    match err {
        MyError::Directory(e) => directory_error_text(e),
        MyError::Workflow(e) => workflow_error_text(e),
        _ => SOMETHING_WENT_WRONG.to_string(),
    }
}

pub async fn handle_error(err: Arc<MyError>, update: Update, state: Arc<AppState>, bot: Bot) {
    error!("An error has occurred: {:?}", err);

    let (user, chat) = extract_info(&update);

    if let Some(chat) = chat
        && let Err(e) = bot
            .send_message(chat.id, user_notice(&err))
            .parse_mode(ParseMode::Html)
            .await
    {
        error!("Failed to send error notice to chat {}: {}", chat.id, e);
    }

    if matches!(*err, MyError::Directory(_) | MyError::Workflow(_)) {
        return;
    }

    let caller = user.map_or("<i>(???)</i>".to_string(), |user| {
        let username = user
            .username
            .as_ref()
            .map_or(String::new(), |u| format!(" (@{})", u));
        format!(
            "{} (<code>{}</code>){}",
            html::escape(&user.full_name()),
            user.id,
            html::escape(&username)
        )
    });
    let report = format!(
        "🚨 <b>New error!</b>\n\n<b>Caller:</b> {}\n\n<b>Error:</b>\n<blockquote expandable>{}</blockquote>\n\n#error",
        caller,
        html::escape(&err.to_string())
    );

    let admin_group = state.config.get_admin_group_id();
    match bot
        .send_message(admin_group, report)
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(_) => info!("Error report sent successfully to chat {}", admin_group),
        Err(e) => error!("Failed to send error report to chat {}: {}", admin_group, e),
    }
}
