use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key under which free-form notes live inside a profile's custom properties
pub const NOTES_PROPERTY: &str = "notes";

/// A named URL-rewrite/stream-limit configuration attached to a playlist source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub playlist_id: Uuid,
    pub name: String,
    /// Maximum concurrent streams, 0 = unlimited
    pub max_streams: u32,
    pub is_backup_only: bool,
    pub search_pattern: String,
    pub replace_pattern: String,
    /// Free-form metadata map; carries the `notes` key among others
    pub custom_properties: Map<String, Value>,
    /// System-managed profile: rewrite/limit fields are immutable, only name/notes editable
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Free-form notes stored in the custom properties map
    pub fn notes(&self) -> &str {
        self.custom_properties
            .get(NOTES_PROPERTY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn pattern_pair(&self) -> PatternPair {
        PatternPair {
            search: self.search_pattern.clone(),
            replace: self.replace_pattern.clone(),
        }
    }
}

/// A search/replace pattern pair
///
/// Two copies exist per form: the immediate pair (updated on every
/// keystroke, drives the local preview) and the stabilized pair (updated
/// after debounce quiescence, drives the remote test request).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternPair {
    pub search: String,
    pub replace: String,
}

impl PatternPair {
    pub fn new<S: Into<String>, R: Into<String>>(search: S, replace: R) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// Derived rendering of the current sample against the immediate pattern pair.
/// Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    /// Sample with non-overlapping matches wrapped in highlight markers
    pub highlighted: String,
    /// Sample with every match globally replaced
    pub replaced: String,
}

/// Outbound test message pushed over the shared preview channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "m3u_profile_test")]
pub struct ProfileTestRequest {
    pub url: String,
    pub search: String,
    pub replace: String,
}

impl ProfileTestRequest {
    pub fn new<U: Into<String>, S: Into<String>, R: Into<String>>(
        url: U,
        search: S,
        replace: R,
    ) -> Self {
        Self {
            url: url.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// Payload for creating a new profile
///
/// The rewrite/limit fields are optional so that default-profile
/// submissions (name + notes only) omit them from the wire entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_streams: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_backup_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_pattern: Option<String>,
    pub custom_properties: Map<String, Value>,
}

/// Payload for updating an existing profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_streams: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_backup_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_pattern: Option<String>,
    pub custom_properties: Map<String, Value>,
}

/// Merge the notes field into existing custom properties, preserving every
/// unrelated key.
pub fn merge_notes(existing: Option<&Map<String, Value>>, notes: &str) -> Map<String, Value> {
    let mut properties = existing.cloned().unwrap_or_default();
    properties.insert(NOTES_PROPERTY.to_string(), Value::String(notes.to_string()));
    properties
}
