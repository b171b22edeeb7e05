use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ModelError;

/// `chrono` format of generated ids: `YYYYMMDDHHMMSS`.
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Width of a generated id.
pub const ID_LEN: usize = 14;

/// The persisted record. Stored as JSON under its `id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Inbound create/update body.
///
/// Accepts the full record shape so a client can send back what it read;
/// `id` and `created_at` must still be well typed but are never used.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TodoInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TodoInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Decode a request body. The bytes only have to be JSON of the record's
    /// shape; no content type is assumed.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        serde_json::from_slice(bytes).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

/// `"title": null` reads as an empty title.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Second-resolution id. Two calls within the same second return the same id.
pub fn generate_id(now: DateTime<Utc>) -> String {
    now.format(ID_FORMAT).to_string()
}

/// Whether `id` has the shape produced by [`generate_id`].
pub fn is_timestamp_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

impl Todo {
    /// Build a new record; whatever id/timestamp the client sent is dropped.
    pub fn from_input(input: TodoInput, id: String, now: DateTime<Utc>) -> Self {
        Self { id, title: input.title, created_at: now }
    }

    /// Take the title from `input`, keep identity and creation time.
    pub fn apply_update(existing: &Todo, input: TodoInput) -> Self {
        Self {
            id: existing.id.clone(),
            title: input.title,
            created_at: existing.created_at,
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ModelError> {
        serde_json::to_vec(self).map_err(|e| ModelError::Encode(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        serde_json::from_slice(bytes).map_err(|e| ModelError::Decode(e.to_string()))
    }
}
