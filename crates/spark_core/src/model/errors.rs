//! Attribute-keyed error collection shared by models and records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered `attribute -> [message]` error list.
///
/// Serializes as a plain JSON object, e.g. `{"name": ["required"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelErrors(BTreeMap<String, Vec<String>>);

impl ModelErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message for `attribute`. Duplicate messages are kept once.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let messages = self.0.entry(attribute.into()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    /// Appends every message from `other`, preserving existing entries.
    pub fn merge(&mut self, other: &ModelErrors) {
        for (attribute, messages) in &other.0 {
            for message in messages {
                self.add(attribute.as_str(), message.as_str());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Returns all messages recorded for `attribute`.
    pub fn get(&self, attribute: &str) -> &[String] {
        self.0
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().map(String::as_str)
    }

    /// Removes messages for one attribute, or everything when `None`.
    pub fn clear(&mut self, attribute: Option<&str>) {
        match attribute {
            Some(attribute) => {
                self.0.remove(attribute);
            }
            None => self.0.clear(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(attribute, messages)| (attribute.as_str(), messages.as_slice()))
    }

    /// Comma-separated attribute names, for log lines.
    pub fn attribute_list(&self) -> String {
        self.0.keys().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}
