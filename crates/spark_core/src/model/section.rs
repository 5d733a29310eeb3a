//! Section domain model.
//!
//! # Responsibility
//! - Define a handle-addressed, enable-able CMS grouping entity.
//! - Own the attribute rules shared by `Section` and `SectionRecord`.
//!
//! # Invariants
//! - `handle` is unique in storage and is the string lookup key.
//! - `handle` starts with a letter and contains only `[A-Za-z0-9_-]`.

use crate::model::{attribute_selected, Model, ModelErrors, ModelMeta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest accepted handle, in characters.
pub const HANDLE_MAX_CHARS: usize = 150;
/// Longest accepted display name, in characters.
pub const NAME_MAX_CHARS: usize = 255;

pub const ERROR_REQUIRED: &str = "required";
pub const ERROR_TOO_LONG: &str = "too_long";
pub const ERROR_INVALID_FORMAT: &str = "invalid_format";

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid handle regex"));

/// Content section addressed by a unique handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(flatten)]
    pub meta: ModelMeta,
    /// Unique machine name, e.g. `news`.
    pub handle: String,
    /// Human-readable label.
    pub name: String,
    /// State flag; disabled sections stay stored but hidden from listings.
    pub enabled: bool,
}

impl Section {
    /// Creates a new, enabled, unsaved section.
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            meta: ModelMeta::default(),
            handle: handle.into(),
            name: name.into(),
            enabled: true,
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.meta.scenario = scenario.into();
        self
    }
}

impl Model for Section {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ModelMeta {
        &mut self.meta
    }

    fn validate(&mut self, attributes: Option<&[String]>) -> bool {
        self.meta.errors.clear(None);
        validate_section_fields(
            self.handle.as_str(),
            self.name.as_str(),
            attributes,
            &mut self.meta.errors,
        );
        self.meta.errors.is_empty()
    }
}

/// Applies section attribute rules, recording failures into `errors`.
pub(crate) fn validate_section_fields(
    handle: &str,
    name: &str,
    attributes: Option<&[String]>,
    errors: &mut ModelErrors,
) {
    if attribute_selected(attributes, "handle") {
        let handle = handle.trim();
        if handle.is_empty() {
            errors.add("handle", ERROR_REQUIRED);
        } else if handle.chars().count() > HANDLE_MAX_CHARS {
            errors.add("handle", ERROR_TOO_LONG);
        } else if !HANDLE_RE.is_match(handle) {
            errors.add("handle", ERROR_INVALID_FORMAT);
        }
    }

    if attribute_selected(attributes, "name") {
        let name = name.trim();
        if name.is_empty() {
            errors.add("name", ERROR_REQUIRED);
        } else if name.chars().count() > NAME_MAX_CHARS {
            errors.add("name", ERROR_TOO_LONG);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Section, ERROR_INVALID_FORMAT, ERROR_REQUIRED, ERROR_TOO_LONG, HANDLE_MAX_CHARS};
    use crate::model::Model;

    #[test]
    fn valid_section_passes() {
        let mut section = Section::new("news", "News");
        assert!(section.validate(None));
        assert!(!section.has_errors());
        assert!(section.is_new());
    }

    #[test]
    fn handle_rules_are_enforced() {
        let mut blank = Section::new("  ", "Blank");
        assert!(!blank.validate(None));
        assert_eq!(blank.errors().first("handle"), Some(ERROR_REQUIRED));

        let mut digit_first = Section::new("1news", "News");
        assert!(!digit_first.validate(None));
        assert_eq!(digit_first.errors().first("handle"), Some(ERROR_INVALID_FORMAT));

        let mut long = Section::new("h".repeat(HANDLE_MAX_CHARS + 1), "Long");
        assert!(!long.validate(None));
        assert_eq!(long.errors().first("handle"), Some(ERROR_TOO_LONG));
    }

    #[test]
    fn attribute_subset_limits_rules_and_clears_old_errors() {
        let mut section = Section::new("bad handle", "");
        assert!(!section.validate(None));
        assert!(section.errors().has("handle"));
        assert!(section.errors().has("name"));

        let subset = vec!["handle".to_string()];
        section.handle = "news".to_string();
        assert!(section.validate(Some(&subset)));
        assert!(!section.has_errors());
    }

    #[test]
    fn serializes_errors_only_when_present() {
        let mut section = Section::new("news", "");
        let clean = serde_json::to_value(&section).expect("section should serialize");
        assert!(clean.get("errors").is_none());
        assert_eq!(clean["handle"], "news");

        section.validate(None);
        let dirty = serde_json::to_value(&section).expect("section should serialize");
        assert_eq!(dirty["errors"], serde_json::json!({ "name": ["required"] }));
    }
}
