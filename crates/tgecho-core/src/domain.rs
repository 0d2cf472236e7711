/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Sequence id the platform assigns to each update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdateId(pub i32);

/// Where the packaged document for one update goes.
///
/// `reply_to` is `None` when the routed-to message has nothing to reply to; the
/// document is then sent without a reply reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoutingMeta {
    pub chat_id: ChatId,
    pub reply_to: Option<MessageId>,
}
