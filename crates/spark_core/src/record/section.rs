//! Section storage record.

use crate::model::section::validate_section_fields;
use crate::record::{Record, RecordMeta};

/// Row-shaped counterpart of `Section` in the `sections` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub meta: RecordMeta,
    pub handle: String,
    pub name: String,
    pub enabled: bool,
}

impl SectionRecord {
    pub fn new(meta: RecordMeta, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            meta,
            handle: handle.into(),
            name: name.into(),
            enabled: true,
        }
    }
}

impl Record for SectionRecord {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
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

    fn string_attribute(&self, name: &str) -> Option<&str> {
        match name {
            "handle" => Some(self.handle.as_str()),
            "name" => Some(self.name.as_str()),
            _ => None,
        }
    }
}
