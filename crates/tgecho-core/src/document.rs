use serde::Serialize;

use crate::domain::UpdateId;

pub const DOCUMENT_EXTENSION: &str = "json";

/// A named in-memory file: the rendered form of one update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn file_name(id: UpdateId) -> String {
        format!("update-{}.{DOCUMENT_EXTENSION}", id.0)
    }

    /// Render `payload` as indented JSON.
    ///
    /// Never fails: if the payload cannot be serialized, the document body is
    /// the serializer's error text instead.
    pub fn render<T: Serialize + ?Sized>(id: UpdateId, payload: &T) -> Self {
        let bytes = match serde_json::to_vec_pretty(payload) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(update_id = id.0, error = %e, "update rendering failed");
                e.to_string().into_bytes()
            }
        };

        Self {
            name: Self::file_name(id),
            bytes,
        }
    }
}
