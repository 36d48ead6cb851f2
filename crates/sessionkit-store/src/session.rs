//! The named session and its persisted record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::Options;

/// Flash list used when no flash key is given.
pub const DEFAULT_FLASH_KEY: &str = "_flash";

/// The persisted part of a session: its values and pending flashes.
///
/// This is what stores serialize. Options and the session name are not
/// part of it; the name keys the cookie and options come from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Key/value state.
    #[serde(default)]
    pub values: BTreeMap<String, Value>,

    /// Flash lists, keyed by flash key. Each list is consumed as a whole.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flashes: BTreeMap<String, Vec<Value>>,
}

/// A named session as loaded from a store.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,

    /// Store-assigned identifier. Cookie-only stores leave this empty.
    pub id: Option<String>,

    record: SessionRecord,

    /// Cookie options used when the session is saved.
    pub options: Options,

    /// True if the store had nothing for this client yet.
    pub is_new: bool,
}

impl Session {
    /// Create an empty session.
    pub fn new(name: impl Into<String>, options: Options) -> Self {
        Self {
            name: name.into(),
            id: None,
            record: SessionRecord::default(),
            options,
            is_new: true,
        }
    }

    /// Rebuild a session from a stored record.
    pub fn from_record(name: impl Into<String>, record: SessionRecord, options: Options) -> Self {
        Self {
            name: name.into(),
            id: None,
            record,
            options,
            is_new: false,
        }
    }

    /// Set the store identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.values.get(key)
    }

    /// Store a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.record.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.record.values.remove(key)
    }

    /// Keys currently holding values.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.record.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.record.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.values.is_empty()
    }

    /// Remove every value and flash list.
    ///
    /// Returns whether there was anything to remove.
    pub fn clear(&mut self) -> bool {
        let had_state = !self.record.values.is_empty() || !self.record.flashes.is_empty();
        self.record.values.clear();
        self.record.flashes.clear();
        had_state
    }

    /// Append a flash message to the list for `key` (default `"_flash"`).
    pub fn add_flash(&mut self, value: Value, key: Option<&str>) {
        self.record
            .flashes
            .entry(key.unwrap_or(DEFAULT_FLASH_KEY).to_string())
            .or_default()
            .push(value);
    }

    /// Remove and return the flash list for `key` (default `"_flash"`).
    pub fn take_flashes(&mut self, key: Option<&str>) -> Vec<Value> {
        self.record
            .flashes
            .remove(key.unwrap_or(DEFAULT_FLASH_KEY))
            .unwrap_or_default()
    }
}
