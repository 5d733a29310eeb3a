//! In-memory entity contracts used by the save/delete orchestrator.
//!
//! # Responsibility
//! - Define the `Model` capability set: identity metadata, validation,
//!   error collection and vetoable lifecycle hooks.
//! - Define the explicit stage result (`StageOutcome`) hooks return.
//!
//! # Invariants
//! - A model without `id` is new; `id` is only assigned from a persisted
//!   record.
//! - Hooks never signal business rejection through `Err`; they veto.

pub mod errors;
pub mod section;

use crate::record::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use errors::ModelErrors;

/// Scenario name used when a model does not select one.
pub const DEFAULT_SCENARIO: &str = "default";

/// Identity and bookkeeping attributes carried by every model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Persisted identifier. `None` until the first successful save.
    pub id: Option<RecordId>,
    /// Unix epoch milliseconds, copied from the record on insert.
    pub date_created: Option<Timestamp>,
    /// Unix epoch milliseconds, copied from the record on every save.
    pub date_updated: Option<Timestamp>,
    /// Stable external identifier assigned by storage on insert.
    pub uid: Option<Uuid>,
    /// Validation scenario; mirrored onto the record when requested.
    pub scenario: String,
    #[serde(default, skip_serializing_if = "ModelErrors::is_empty")]
    pub errors: ModelErrors,
}

impl Default for ModelMeta {
    fn default() -> Self {
        Self {
            id: None,
            date_created: None,
            date_updated: None,
            uid: None,
            scenario: DEFAULT_SCENARIO.to_string(),
            errors: ModelErrors::new(),
        }
    }
}

/// Event payload handed to model lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEvent {
    /// Whether the model had no identifier when the workflow started.
    pub is_new: bool,
}

impl ModelEvent {
    pub fn new(is_new: bool) -> Self {
        Self { is_new }
    }
}

/// Result of one vetoable lifecycle stage.
///
/// `proceed = false` is a business rejection: the orchestrator rolls back,
/// attaches `errors` to the model and reports `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub proceed: bool,
    pub errors: ModelErrors,
}

impl StageOutcome {
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            errors: ModelErrors::new(),
        }
    }

    pub fn veto() -> Self {
        Self::veto_with(ModelErrors::new())
    }

    /// Vetoes the stage and reports `errors` back onto the model.
    pub fn veto_with(errors: ModelErrors) -> Self {
        Self {
            proceed: false,
            errors,
        }
    }

    pub fn is_vetoed(&self) -> bool {
        !self.proceed
    }
}

impl Default for StageOutcome {
    fn default() -> Self {
        Self::proceed()
    }
}

/// Mutable business object persisted through a record.
pub trait Model {
    fn meta(&self) -> &ModelMeta;
    fn meta_mut(&mut self) -> &mut ModelMeta;

    /// Validates the model, optionally limited to `attributes`.
    ///
    /// Implementations clear previous errors and record new ones on the meta
    /// error list. Returns `true` when no errors were recorded.
    fn validate(&mut self, attributes: Option<&[String]>) -> bool;

    fn id(&self) -> Option<RecordId> {
        self.meta().id
    }

    fn is_new(&self) -> bool {
        self.meta().id.is_none()
    }

    fn scenario(&self) -> &str {
        self.meta().scenario.as_str()
    }

    fn errors(&self) -> &ModelErrors {
        &self.meta().errors
    }

    fn has_errors(&self) -> bool {
        !self.meta().errors.is_empty()
    }

    fn add_errors(&mut self, errors: &ModelErrors) {
        self.meta_mut().errors.merge(errors);
    }

    /// Runs inside the save transaction, before the record is built.
    fn before_save(&mut self, _event: &ModelEvent) -> StageOutcome {
        StageOutcome::proceed()
    }

    /// Runs inside the save transaction, after attributes were transferred.
    fn after_save(&mut self, _event: &ModelEvent) -> StageOutcome {
        StageOutcome::proceed()
    }

    /// Runs inside the delete transaction, before the record is re-fetched.
    fn before_delete(&mut self, _event: &ModelEvent) -> StageOutcome {
        StageOutcome::proceed()
    }

    /// Runs inside the delete transaction, after the record was deleted.
    fn after_delete(&mut self, _event: &ModelEvent) -> StageOutcome {
        StageOutcome::proceed()
    }
}

/// Returns whether `attribute` takes part in a validation/save pass limited
/// to `attributes` (`None` selects everything).
pub fn attribute_selected(attributes: Option<&[String]>, attribute: &str) -> bool {
    attributes.map_or(true, |names| names.iter().any(|name| name == attribute))
}

#[cfg(test)]
mod tests {
    use super::{attribute_selected, ModelErrors, ModelMeta, StageOutcome, DEFAULT_SCENARIO};

    #[test]
    fn default_meta_is_new_with_default_scenario() {
        let meta = ModelMeta::default();
        assert!(meta.id.is_none());
        assert!(meta.uid.is_none());
        assert_eq!(meta.scenario, DEFAULT_SCENARIO);
    }

    #[test]
    fn veto_with_carries_errors() {
        let mut errors = ModelErrors::new();
        errors.add("handle", "reserved");
        let outcome = StageOutcome::veto_with(errors.clone());
        assert!(outcome.is_vetoed());
        assert_eq!(outcome.errors, errors);
        assert!(!StageOutcome::default().is_vetoed());
    }

    #[test]
    fn attribute_selection_defaults_to_all() {
        let subset = vec!["name".to_string()];
        assert!(attribute_selected(None, "handle"));
        assert!(attribute_selected(Some(&subset), "name"));
        assert!(!attribute_selected(Some(&subset), "handle"));
    }
}
