//! Caller-owned session state.
//!
//! A [`StateStore`] holds named snapshots of plot and scene settings for the
//! lifetime of a simulation session. It is passed explicitly into the
//! `save_state`/`restore_state` calls of whatever needs persisting, so two
//! sessions in one process never share state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// A key/value store of JSON documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStore {
    entries: BTreeMap<String, serde_json::Value>,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn save<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        log::debug!("saving state '{key}'");
        self.entries.insert(key, serde_json::to_value(value)?);
        Ok(())
    }

    /// Reads the entry under `key`. A missing key is `Ok(None)`.
    pub fn restore<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.entries.get(key) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Removes and returns the raw entry under `key`.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serializes the whole store as one JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Rebuilds a store from the output of [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }
}
