//! Telegram transport: long-polls updates, hands text to the router and
//! sends replies or documents back to the chat.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, InputFile};
use tracing::{debug, info, warn};

use super::router::{self, Command, FAILURE_TEXT, MAX_MESSAGE_LENGTH, Reply};
use crate::application::LedgerService;

/// Run the bot until Ctrl-C.
pub async fn run(token: String, service: Arc<LedgerService>) -> Result<()> {
    let bot = Bot::new(token);

    let commands = Command::ALL
        .iter()
        .map(|c| BotCommand::new(c.name(), c.description()));
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!("telegram bot starting");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram bot stopped");
    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    service: Arc<LedgerService>,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    debug!(chat = ?msg.chat.id, "telegram received message");

    let today = Local::now().date_naive();
    match router::handle_input(&service, text, today).await {
        Ok(Reply::Text(reply)) => {
            for chunk in router::chunk_message(&reply, MAX_MESSAGE_LENGTH) {
                bot.send_message(msg.chat.id, chunk).await?;
            }
        }
        Ok(Reply::Document { file_name, bytes }) => {
            bot.send_document(msg.chat.id, InputFile::memory(bytes).file_name(file_name))
                .await?;
        }
        Err(e) => {
            warn!(chat = ?msg.chat.id, "failed to handle message: {e:#}");
            bot.send_message(msg.chat.id, FAILURE_TEXT).await?;
        }
    }

    Ok(())
}
