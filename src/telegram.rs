//! Telegram transport: long polling, update dispatch, and delivery of router replies.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, User};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::bot::render::Screen;
use crate::bot::{ChatCommand, ChatScope, Claimant, Router};
use crate::error::ExitError;

fn claimant(user: &User) -> Claimant {
    Claimant::new(user.id.0, user.full_name())
}

fn scope(msg: &Message) -> ChatScope {
    if msg.chat.is_private() {
        ChatScope::Private
    } else if msg.chat.is_group() || msg.chat.is_supergroup() {
        ChatScope::Group
    } else {
        ChatScope::Other
    }
}

fn keyboard(screen: &Screen) -> Option<InlineKeyboardMarkup> {
    if screen.keyboard.is_empty() {
        return None;
    }
    let rows = screen.keyboard.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    });
    Some(InlineKeyboardMarkup::new(rows))
}

async fn on_command(
    bot: Bot,
    msg: Message,
    command: ChatCommand,
    router: Arc<Router>,
) -> ResponseResult<()> {
    let from = msg.from.as_ref().map(claimant);
    let Some(screen) = router.handle_command(command, scope(&msg), from.as_ref()) else {
        return Ok(());
    };

    let mut request = bot
        .send_message(msg.chat.id, screen.text.clone())
        .parse_mode(ParseMode::Html);
    if let Some(markup) = keyboard(&screen) {
        request = request.reply_markup(markup);
    }
    if let Err(e) = request.await {
        warn!(chat = msg.chat.id.0, ?command, "send failed: {e}");
    }
    Ok(())
}

async fn on_callback(bot: Bot, query: CallbackQuery, router: Arc<Router>) -> ResponseResult<()> {
    let from = claimant(&query.from);
    let data = query.data.as_deref().unwrap_or_default();
    let reply = router.handle_callback(data, &from);

    let mut answer = bot.answer_callback_query(query.id.clone());
    if let Some(notice) = &reply.notice {
        answer = answer.text(notice.clone()).show_alert(true);
    }
    if let Err(e) = answer.await {
        warn!(claimant = %from.id, "answering button press failed: {e}");
    }

    let Some(screen) = reply.edit else {
        return Ok(());
    };
    let Some(msg) = query.regular_message() else {
        warn!(claimant = %from.id, "button message no longer accessible; nothing to edit");
        return Ok(());
    };

    let mut request = bot
        .edit_message_text(msg.chat.id, msg.id, screen.text.clone())
        .parse_mode(ParseMode::Html);
    if let Some(markup) = keyboard(&screen) {
        request = request.reply_markup(markup);
    }
    if let Err(e) = request.await {
        warn!(chat = msg.chat.id.0, claimant = %from.id, "edit failed: {e}");
    }
    Ok(())
}

/// Connect with `token` and serve updates until Ctrl-C.
pub async fn run(token: String, router: Router) -> anyhow::Result<()> {
    let bot = Bot::new(token);

    let me = bot
        .get_me()
        .await
        .map_err(|e| ExitError::Transport(format!("getMe: {e}")))?;
    info!(username = me.username(), "connected to Telegram");

    if let Err(e) = bot.set_my_commands(ChatCommand::bot_commands()).await {
        warn!("registering bot commands failed: {e}");
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<ChatCommand>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("polling for updates; press Ctrl-C to stop");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::new(router)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("stopped");
    Ok(())
}
