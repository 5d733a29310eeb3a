//! Section service wiring: binding plus SQLite gateway.
//!
//! # Invariants
//! - String lookups are keyed by `handle`.
//! - Records are built from trimmed handle/name values.

use crate::gateway::{GatewayResult, SqliteSectionGateway};
use crate::model::section::Section;
use crate::model::ModelMeta;
use crate::record::section::SectionRecord;
use crate::record::{Record, RecordMeta};
use crate::service::model_service::{ModelBinding, ModelService};
use rusqlite::Connection;

/// Maps `Section` models to `SectionRecord`s and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionBinding;

impl ModelBinding for SectionBinding {
    type Model = Section;
    type Record = SectionRecord;

    fn model_name(&self) -> &'static str {
        "section"
    }

    fn to_record(&self, model: &Section, mirror_scenario: bool) -> SectionRecord {
        let mut meta = match model.meta.id {
            Some(id) => RecordMeta::with_id(id),
            None => RecordMeta::new(),
        };
        meta.uid = model.meta.uid;
        meta.date_created = model.meta.date_created;
        meta.date_updated = model.meta.date_updated;
        if mirror_scenario {
            meta.scenario = model.meta.scenario.clone();
        }

        SectionRecord {
            meta,
            handle: model.handle.trim().to_string(),
            name: model.name.trim().to_string(),
            enabled: model.enabled,
        }
    }

    fn to_model(&self, record: SectionRecord) -> Section {
        let meta = ModelMeta {
            id: record.id(),
            date_created: record.meta.date_created,
            date_updated: record.meta.date_updated,
            uid: record.meta.uid,
            scenario: record.meta.scenario.clone(),
            ..ModelMeta::default()
        };
        Section {
            meta,
            handle: record.handle,
            name: record.name,
            enabled: record.enabled,
        }
    }

    fn string_property(&self) -> &'static str {
        "handle"
    }

    fn string_value(&self, model: &Section) -> Option<String> {
        let handle = model.handle.trim();
        (!handle.is_empty()).then(|| handle.to_string())
    }
}

/// Section CRUD service over one SQLite connection.
pub type SectionService<'conn> = ModelService<SqliteSectionGateway<'conn>, SectionBinding>;

impl<'conn> ModelService<SqliteSectionGateway<'conn>, SectionBinding> {
    /// Builds a section service after verifying the connection schema.
    pub fn for_connection(conn: &'conn Connection) -> GatewayResult<Self> {
        Ok(Self::new(SqliteSectionGateway::try_new(conn)?, SectionBinding))
    }
}
