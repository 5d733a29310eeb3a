//! Generic CRUD orchestration for model/record pairs.
//!
//! Services save and delete models inside scoped transactions, and resolve
//! models by string key through a per-service cache that remembers absent
//! keys.

pub mod cache;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod record;
pub mod service;

pub use cache::{CacheEntry, CacheLookup, StringCache};
pub use gateway::{
    Condition, ConditionValue, GatewayError, GatewayResult, PersistenceGateway,
    SqliteSectionGateway, TransactionScope,
};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::section::Section;
pub use model::{Model, ModelErrors, ModelEvent, ModelMeta, StageOutcome};
pub use record::section::SectionRecord;
pub use record::{Record, RecordId, RecordMeta, Timestamp};
pub use service::{
    ModelBinding, ModelService, SaveOptions, SectionBinding, SectionService, ServiceError,
    ServiceResult,
};

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
