//! Wire schema for the widget document.
//!
//! The JSON overlays four optional fields on each payload; which widget a
//! payload describes is decided later by [`WidgetPayload::classify`]
//! (see [`crate::core::widget`]).  Everything here is plain data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The malformed/incompatible-body error.  Decoding is all-or-nothing.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid view document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A full document: the widget payloads plus the order they are shown in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDocument {
    pub data: Vec<Datum>,
    /// Widget names, in display order.
    pub view: Vec<String>,
}

impl ViewDocument {
    /// The canonical `{ data: [], view: [] }` document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve a view name to its datum.
    ///
    /// A name with no matching datum resolves to the *first* datum instead of
    /// failing; only an empty `data` list yields `None`.
    pub fn resolve(&self, name: &str) -> Option<&Datum> {
        self.data
            .iter()
            .find(|d| d.name == name)
            .or_else(|| self.data.first())
    }
}

/// One named payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datum {
    pub name: String,
    #[serde(rename = "data")]
    pub payload: WidgetPayload,
}

/// Structurally typed payload — the widget kind is inferred from which
/// fields are present together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        rename = "selectedId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
}

/// A single option of a choice widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Sort key.  Not guaranteed to be unique.
    pub id: i64,
    #[serde(rename = "text")]
    pub label: String,
}

/// Decode a document from raw response bytes.
pub fn decode(bytes: &[u8]) -> Result<ViewDocument, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a document back into its wire form.
#[cfg(test)]
pub fn encode(doc: &ViewDocument) -> Result<Vec<u8>, DecodeError> {
    Ok(serde_json::to_vec(doc)?)
}
