//! teloxide update -> core update.

use serde_json::{Map, Value};
use teloxide::types::{self as tg, UpdateKind as TgKind};

use tgecho_core::{
    domain::{ChatId, MessageId, UpdateId},
    update::{CallbackQuery, Message, Update, UpdateKind},
};

/// Keys of the routed variants; always present in the payload, `null` when unset.
const VARIANT_KEYS: [&str; 5] = [
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
    "callback_query",
];

/// Convert a fetched update into a core update carrying its JSON form.
///
/// Updates teloxide could not parse arrive as `UpdateKind::Error(raw)`; their raw
/// fields are merged back into the payload and routed from the raw JSON.
pub fn to_core(update: tg::Update) -> Update<Value> {
    let kind = kind_of(&update.kind);
    Update::new(UpdateId(update.id), kind, payload(&update))
}

pub fn kind_of(kind: &TgKind) -> UpdateKind {
    match kind {
        TgKind::Message(m) => UpdateKind::Message(message(m)),
        TgKind::EditedMessage(m) => UpdateKind::EditedMessage(message(m)),
        TgKind::ChannelPost(m) => UpdateKind::ChannelPost(message(m)),
        TgKind::EditedChannelPost(m) => UpdateKind::EditedChannelPost(message(m)),
        TgKind::CallbackQuery(q) => UpdateKind::CallbackQuery(CallbackQuery {
            id: q.id.clone(),
            message: q.message.as_ref().map(message),
        }),
        TgKind::Error(raw) => kind_from_raw(raw),
        _ => UpdateKind::Other,
    }
}

fn message(m: &tg::Message) -> Message {
    Message {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
        reply_to: m.reply_to_message().map(|parent| Box::new(message(parent))),
    }
}

/// Route an unparsed update from its raw Bot API JSON.
fn kind_from_raw(raw: &Value) -> UpdateKind {
    let variant = |key: &str| raw.get(key).filter(|v| !v.is_null());

    if let Some(m) = variant("message").and_then(raw_message) {
        return UpdateKind::Message(m);
    }
    if let Some(m) = variant("edited_message").and_then(raw_message) {
        return UpdateKind::EditedMessage(m);
    }
    if let Some(m) = variant("channel_post").and_then(raw_message) {
        return UpdateKind::ChannelPost(m);
    }
    if let Some(m) = variant("edited_channel_post").and_then(raw_message) {
        return UpdateKind::EditedChannelPost(m);
    }
    if let Some(q) = variant("callback_query") {
        if let Some(id) = q.get("id").and_then(Value::as_str) {
            return UpdateKind::CallbackQuery(CallbackQuery {
                id: id.to_string(),
                message: q.get("message").and_then(raw_message),
            });
        }
    }
    UpdateKind::Other
}

fn raw_message(v: &Value) -> Option<Message> {
    let chat_id = v.pointer("/chat/id")?.as_i64()?;
    let message_id = i32::try_from(v.get("message_id")?.as_i64()?).ok()?;
    Some(Message {
        chat_id: ChatId(chat_id),
        message_id: MessageId(message_id),
        reply_to: v
            .get("reply_to_message")
            .and_then(raw_message)
            .map(Box::new),
    })
}

/// JSON form of the whole update, with every routed variant key present.
fn payload(update: &tg::Update) -> Value {
    let mut out = match serde_json::to_value(update) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("update".to_string(), other);
            map
        }
        Err(e) => {
            tracing::warn!(update_id = update.id, error = %e, "update rendering failed");
            let mut map = Map::new();
            map.insert("update_id".to_string(), Value::from(update.id));
            map.insert("error".to_string(), Value::String(e.to_string()));
            map
        }
    };

    if let TgKind::Error(raw) = &update.kind {
        match raw {
            Value::Object(fields) => {
                for (k, v) in fields {
                    out.insert(k.clone(), v.clone());
                }
            }
            other => {
                out.insert("raw".to_string(), other.clone());
            }
        }
    }

    for key in VARIANT_KEYS {
        out.entry(key).or_insert(Value::Null);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tgecho_core::{classify::NotClassifiable, document::Document};

    use super::*;

    fn user() -> Value {
        json!({"id": 42, "is_bot": false, "first_name": "Ada", "username": "ada"})
    }

    fn private_chat(id: i64) -> Value {
        json!({"id": id, "type": "private", "first_name": "Ada", "username": "ada"})
    }

    fn text_message(chat: Value, id: i32, text: &str) -> Value {
        json!({
            "message_id": id,
            "from": user(),
            "chat": chat,
            "date": 1_700_000_000,
            "text": text,
        })
    }

    // Bot API responses arrive as text; parse fixtures the same way.
    fn parse(v: Value) -> tg::Update {
        serde_json::from_str(&v.to_string()).unwrap()
    }

    #[test]
    fn message_update() {
        let upd = parse(json!({
            "update_id": 500,
            "message": text_message(private_chat(100), 1, "hi"),
        }));
        let core = to_core(upd);

        assert_eq!(core.id, UpdateId(500));
        assert_eq!(
            core.kind,
            UpdateKind::Message(Message::new(ChatId(100), MessageId(1)))
        );
        assert_eq!(core.payload["update_id"], 500);
        assert_eq!(core.payload["message"]["text"], "hi");
    }

    #[test]
    fn edited_message_update() {
        let mut edited = text_message(private_chat(100), 3, "hi again");
        edited["edit_date"] = json!(1_700_000_100);
        let core = to_core(parse(json!({"update_id": 501, "edited_message": edited})));

        assert_eq!(
            core.kind,
            UpdateKind::EditedMessage(Message::new(ChatId(100), MessageId(3)))
        );
    }

    #[test]
    fn channel_post_update() {
        let channel = json!({"id": -1001234567890i64, "type": "channel", "title": "news"});
        let post = json!({
            "message_id": 9,
            "sender_chat": channel.clone(),
            "chat": channel,
            "date": 1_700_000_000,
            "text": "post",
        });
        let core = to_core(parse(json!({"update_id": 502, "channel_post": post})));

        assert_eq!(
            core.kind,
            UpdateKind::ChannelPost(Message::new(ChatId(-1001234567890), MessageId(9)))
        );
    }

    #[test]
    fn callback_keeps_nested_reply_target() {
        let mut origin = text_message(private_chat(7), 900, "pick one");
        origin["reply_to_message"] = text_message(private_chat(7), 42, "question");
        let upd = parse(json!({
            "update_id": 503,
            "callback_query": {
                "id": "4382bfdwdsb323b2d9",
                "from": user(),
                "message": origin,
                "chat_instance": "-1234",
                "data": "choice:1",
            },
        }));

        let core = to_core(upd);
        let UpdateKind::CallbackQuery(q) = &core.kind else {
            panic!("expected callback query, got {:?}", core.kind);
        };
        assert_eq!(q.id, "4382bfdwdsb323b2d9");

        let route = core.route().unwrap();
        assert_eq!(route.chat_id, ChatId(7));
        assert_eq!(route.reply_to, Some(MessageId(42)));
    }

    #[test]
    fn unrouted_kinds_become_other() {
        let upd = parse(json!({
            "update_id": 504,
            "inline_query": {
                "id": "q1",
                "from": user(),
                "query": "cats",
                "offset": "",
            },
        }));
        assert_eq!(to_core(upd).kind, UpdateKind::Other);
    }

    #[test]
    fn edited_channel_post_update() {
        let channel = json!({"id": -1009, "type": "channel", "title": "news"});
        let post = json!({
            "message_id": 88,
            "sender_chat": channel.clone(),
            "chat": channel,
            "date": 1_700_000_000,
            "edit_date": 1_700_000_050,
            "text": "post, fixed",
        });
        let core = to_core(parse(json!({"update_id": 505, "edited_channel_post": post})));

        assert_eq!(
            core.kind,
            UpdateKind::EditedChannelPost(Message::new(ChatId(-1009), MessageId(88)))
        );
    }

    #[test]
    fn inline_callback_has_no_origin() {
        let upd = parse(json!({
            "update_id": 506,
            "callback_query": {
                "id": "x",
                "from": user(),
                "inline_message_id": "AAAAAQ",
                "chat_instance": "-77",
                "data": "vote:1",
            },
        }));
        let core = to_core(upd);

        assert_eq!(
            core.kind,
            UpdateKind::CallbackQuery(CallbackQuery {
                id: "x".to_string(),
                message: None,
            })
        );
        assert_eq!(core.route(), Err(NotClassifiable::MissingOrigin));
    }

    #[test]
    fn payload_lists_every_variant_key() {
        let core = to_core(parse(json!({
            "update_id": 12345,
            "message": text_message(private_chat(100), 1, "hi"),
        })));
        let doc = Document::render(core.id, &core.payload);
        let text = String::from_utf8_lossy(&doc.bytes);

        assert_eq!(doc.name, "update-12345.json");
        assert!(text.contains("\"message_id\": 1"));
        for key in ["edited_message", "channel_post", "edited_channel_post", "callback_query"] {
            assert!(text.contains(&format!("\"{key}\": null")), "missing {key} in {text}");
        }
    }

    #[test]
    fn unparsed_update_keeps_raw_fields() {
        let raw = json!({
            "update_id": 12345,
            "edited_message": {
                "message_id": 31,
                "chat": {"id": 100, "type": "private"},
                "date": 1_700_000_000,
                "future_field": {"nested": true},
            },
        });
        let upd = tg::Update {
            id: 12345,
            kind: TgKind::Error(raw),
        };
        let core = to_core(upd);

        assert_eq!(
            core.kind,
            UpdateKind::EditedMessage(Message::new(ChatId(100), MessageId(31)))
        );
        assert_eq!(core.payload["update_id"], 12345);
        assert_eq!(
            core.payload["edited_message"]["future_field"]["nested"],
            true
        );
        assert!(core.payload["message"].is_null());

        let doc = Document::render(core.id, &core.payload);
        assert!(String::from_utf8_lossy(&doc.bytes).contains("future_field"));
    }

    #[test]
    fn unparsed_callback_routes_from_raw() {
        let raw = json!({
            "update_id": 9,
            "callback_query": {
                "id": "cb",
                "message": {
                    "message_id": 900,
                    "chat": {"id": 7},
                    "reply_to_message": {"message_id": 42, "chat": {"id": 7}},
                },
            },
        });
        let core = to_core(tg::Update {
            id: 9,
            kind: TgKind::Error(raw),
        });

        let route = core.route().unwrap();
        assert_eq!(route.chat_id, ChatId(7));
        assert_eq!(route.reply_to, Some(MessageId(42)));
    }

    #[test]
    fn unparsed_unknown_kind_is_other() {
        let core = to_core(tg::Update {
            id: 10,
            kind: TgKind::Error(json!({"update_id": 10, "business_message": {"x": 1}})),
        });
        assert_eq!(core.kind, UpdateKind::Other);
        assert_eq!(core.payload["business_message"]["x"], 1);
    }
}
