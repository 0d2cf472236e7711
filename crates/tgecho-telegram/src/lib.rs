//! Telegram adapter (teloxide).
//!
//! This crate implements the `tgecho-core` feed and delivery ports over the
//! Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
};

pub mod convert;
pub mod session;

use tgecho_core::{
    document::Document,
    domain::{ChatId, MessageId, RoutingMeta},
    errors::Error,
    ports::DeliverySink,
    Result,
};

pub use session::{connect, Connected, TelegramFeed};

/// Sends packaged update documents back into Telegram chats.
#[derive(Clone)]
pub struct TelegramDelivery {
    bot: Bot,
}

impl TelegramDelivery {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl DeliverySink for TelegramDelivery {
    async fn send_document(&self, route: RoutingMeta, document: Document) -> Result<()> {
        let Document { name, bytes } = document;
        let size = bytes.len();

        let mut req = self
            .bot
            .send_document(
                Self::tg_chat(route.chat_id),
                InputFile::memory(bytes).file_name(name.clone()),
            )
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(reply_to) = route.reply_to {
            req = req.reply_to_message_id(Self::tg_msg_id(reply_to));
        }

        let sent = req.await.map_err(Self::map_err)?;
        tracing::debug!(
            chat_id = route.chat_id.0,
            message_id = sent.id.0,
            file_name = %name,
            size,
            "update document sent"
        );
        Ok(())
    }
}
