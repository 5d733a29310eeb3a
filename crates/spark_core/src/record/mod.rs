//! Persistence-side counterparts of models.
//!
//! # Responsibility
//! - Define the `Record` contract gateways persist and orchestrators convert.
//! - Carry storage-assigned identity (`id`, timestamps, `uid`).
//!
//! # Invariants
//! - A record identifier, once assigned, never changes and is the only key
//!   used to re-fetch the record.

pub mod section;

use crate::model::{ModelErrors, DEFAULT_SCENARIO};
use uuid::Uuid;

/// Storage-assigned record identifier.
pub type RecordId = i64;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Identity and bookkeeping attributes carried by every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    id: Option<RecordId>,
    pub date_created: Option<Timestamp>,
    pub date_updated: Option<Timestamp>,
    pub uid: Option<Uuid>,
    pub scenario: String,
    pub errors: ModelErrors,
}

impl RecordMeta {
    /// Metadata for a record that has not been inserted yet.
    pub fn new() -> Self {
        Self {
            id: None,
            date_created: None,
            date_updated: None,
            uid: None,
            scenario: DEFAULT_SCENARIO.to_string(),
            errors: ModelErrors::new(),
        }
    }

    /// Metadata for a record already known to storage.
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::new()
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Assigns the storage identifier.
    ///
    /// Returns `false` and keeps the current value when an identifier is
    /// already assigned.
    pub fn assign_id(&mut self, id: RecordId) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(id);
        true
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted representation of a model.
pub trait Record {
    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Validates record attributes, optionally limited to `attributes`.
    ///
    /// Clears previous errors; returns `true` when none were recorded.
    fn validate(&mut self, attributes: Option<&[String]>) -> bool;

    /// Value of a string attribute by column name, if the record has one.
    fn string_attribute(&self, name: &str) -> Option<&str>;

    fn id(&self) -> Option<RecordId> {
        self.meta().id()
    }

    fn errors(&self) -> &ModelErrors {
        &self.meta().errors
    }

    fn add_error(&mut self, attribute: &str, message: &str) {
        self.meta_mut().errors.add(attribute, message);
    }
}
