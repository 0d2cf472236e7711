//! Inbound update model.
//!
//! One constructor per event shape the relay routes, so "exactly one variant
//! populated" holds by construction. Platform-specific payloads ride along in
//! [`Update::payload`] untouched; the packaged document is rendered from them.

use crate::{
    classify::{classify, NotClassifiable},
    domain::{ChatId, MessageId, RoutingMeta, UpdateId},
};

/// One inbound event from the long-poll feed.
#[derive(Clone, Debug)]
pub struct Update<P> {
    pub id: UpdateId,
    pub kind: UpdateKind,
    pub payload: P,
}

impl<P> Update<P> {
    pub fn new(id: UpdateId, kind: UpdateKind, payload: P) -> Self {
        Self { id, kind, payload }
    }

    /// Routing metadata for the reply document.
    pub fn route(&self) -> std::result::Result<RoutingMeta, NotClassifiable> {
        classify(&self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    CallbackQuery(CallbackQuery),
    /// Any event shape the relay does not route (inline queries, polls,
    /// membership changes, kinds newer than the adapter).
    Other,
}

impl UpdateKind {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::ChannelPost(_) => "channel_post",
            UpdateKind::EditedChannelPost(_) => "edited_channel_post",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::Other => "other",
        }
    }
}

/// The parts of a chat message the relay needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub reply_to: Option<Box<Message>>,
}

impl Message {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            chat_id,
            message_id,
            reply_to: None,
        }
    }

    pub fn replying_to(mut self, parent: Message) -> Self {
        self.reply_to = Some(Box::new(parent));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackQuery {
    pub id: String,
    /// Message carrying the pressed button. Absent for inline-mode messages.
    pub message: Option<Message>,
}
