use crate::{
    domain::RoutingMeta,
    update::{Message, UpdateKind},
};

/// Why no route could be derived for an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotClassifiable {
    #[error("unsupported update type")]
    UnsupportedKind,

    #[error("callback query has no originating message")]
    MissingOrigin,
}

/// Derive the destination chat and reply target for an update.
///
/// Message-like variants reply to the triggering message itself. A callback
/// query replies to whatever its button message was itself replying to (one
/// level deeper), and yields `reply_to: None` when that message replied to
/// nothing. Arm order mirrors the routing priority:
/// message, edited message, channel post, edited channel post, callback query.
pub fn classify(kind: &UpdateKind) -> Result<RoutingMeta, NotClassifiable> {
    match kind {
        UpdateKind::Message(m)
        | UpdateKind::EditedMessage(m)
        | UpdateKind::ChannelPost(m)
        | UpdateKind::EditedChannelPost(m) => Ok(direct(m)),
        UpdateKind::CallbackQuery(q) => {
            let origin = q.message.as_ref().ok_or(NotClassifiable::MissingOrigin)?;
            Ok(RoutingMeta {
                chat_id: origin.chat_id,
                reply_to: origin.reply_to.as_ref().map(|parent| parent.message_id),
            })
        }
        UpdateKind::Other => Err(NotClassifiable::UnsupportedKind),
    }
}

fn direct(m: &Message) -> RoutingMeta {
    RoutingMeta {
        chat_id: m.chat_id,
        reply_to: Some(m.message_id),
    }
}
