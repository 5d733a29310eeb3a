//! Generic model service and the binding contract concrete services supply.
//!
//! # Responsibility
//! - Own one persistence gateway, one model binding and the string cache.
//! - Define service-level errors and save options.
//!
//! # Invariants
//! - Business rejection is `Ok(false)` with errors on the model; `Err` is
//!   always a fault raised after the transaction was rolled back.
//! - The string cache is only mutated through `&mut self`.

use crate::cache::StringCache;
use crate::gateway::{GatewayError, PersistenceGateway, TransactionScope};
use crate::model::{Model, ModelErrors, StageOutcome};
use crate::record::{Record, RecordId, Timestamp};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by model services.
#[derive(Debug)]
pub enum ServiceError {
    /// Gateway fault, returned unchanged after rollback.
    Gateway(GatewayError),
    /// Delete was requested for a model that was never saved.
    Unsaved,
    /// The record behind a model identifier no longer exists.
    RecordMissing(RecordId),
    /// No model exists for the string key.
    NotFound { property: &'static str, value: String },
    /// No record exists for the string key.
    RecordNotFound { property: &'static str, value: String },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gateway(err) => write!(f, "{err}"),
            Self::Unsaved => write!(f, "model has no identifier"),
            Self::RecordMissing(id) => write!(f, "record does not exist with the id {id}"),
            Self::NotFound { property, value } => {
                write!(f, "object does not exist with the {property} \"{value}\"")
            }
            Self::RecordNotFound { property, value } => {
                write!(f, "record does not exist with the {property} \"{value}\"")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GatewayError> for ServiceError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Options for `ModelService::save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Run model validation before opening the transaction.
    pub run_validation: bool,
    /// Limit validation and update columns to these attributes.
    pub attributes: Option<Vec<String>>,
    /// Copy the model scenario onto the converted record.
    pub mirror_scenario: bool,
}

impl SaveOptions {
    pub fn without_validation(mut self) -> Self {
        self.run_validation = false;
        self
    }

    pub fn only<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn without_mirrored_scenario(mut self) -> Self {
        self.mirror_scenario = false;
        self
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            run_validation: true,
            attributes: None,
            mirror_scenario: true,
        }
    }
}

/// Entity-specific capabilities a concrete service plugs into `ModelService`.
pub trait ModelBinding {
    type Model: Model;
    type Record: Record;

    /// Short name used in log events.
    fn model_name(&self) -> &'static str;

    /// Builds the record to persist for `model`.
    fn to_record(&self, model: &Self::Model, mirror_scenario: bool) -> Self::Record;

    /// Materializes a model from a loaded record.
    fn to_model(&self, record: Self::Record) -> Self::Model;

    /// Model attribute used as string lookup key.
    fn string_property(&self) -> &'static str;

    /// Record column queried for string lookups.
    fn record_string_property(&self) -> &'static str {
        self.string_property()
    }

    /// Lookup key of `model`; `None` keeps the model out of the cache.
    fn string_value(&self, model: &Self::Model) -> Option<String>;

    /// Copies storage-assigned fields onto the model after persisting.
    fn transfer_from_record(&self, model: &mut Self::Model, record: &Self::Record, is_new: bool) {
        let source = record.meta();
        let target = model.meta_mut();
        if is_new {
            target.id = source.id();
            target.date_created = source.date_created;
            target.uid = source.uid;
        }
        target.date_updated = source.date_updated;
    }

    /// Service-level veto, evaluated before the transaction opens.
    fn before_save(&self, _model: &Self::Model, _is_new: bool) -> StageOutcome {
        StageOutcome::proceed()
    }

    /// Notification after commit; cannot veto.
    fn after_save(&self, _model: &Self::Model, _is_new: bool) {}

    /// Service-level veto, evaluated before the transaction opens.
    fn before_delete(&self, _model: &Self::Model) -> StageOutcome {
        StageOutcome::proceed()
    }
}

/// Generic CRUD service parameterized by a gateway value and a binding.
pub struct ModelService<G, B>
where
    G: PersistenceGateway,
    B: ModelBinding<Record = G::Record>,
{
    pub(super) gateway: G,
    pub(super) binding: B,
    pub(super) string_cache: StringCache<B::Model>,
}

impl<G, B> ModelService<G, B>
where
    G: PersistenceGateway,
    B: ModelBinding<Record = G::Record>,
{
    pub fn new(gateway: G, binding: B) -> Self {
        Self {
            gateway,
            binding,
            string_cache: StringCache::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Loads the record behind `id`, if it exists.
    pub fn find_record_by_id(&self, id: RecordId) -> ServiceResult<Option<G::Record>> {
        Ok(self.gateway.fetch_by_id(id)?)
    }

    /// Loads the record behind `id`, failing with `RecordMissing` otherwise.
    pub fn get_record_by_id(&self, id: RecordId) -> ServiceResult<G::Record> {
        self.find_record_by_id(id)?.ok_or(ServiceError::RecordMissing(id))
    }
}

/// Lifecycle stage that stopped a workflow, with the errors to report.
pub(super) struct Halt {
    pub(super) stage: &'static str,
    pub(super) errors: ModelErrors,
}

impl Halt {
    pub(super) fn new(stage: &'static str, errors: ModelErrors) -> Self {
        Self { stage, errors }
    }

    /// Converts a vetoed outcome into a halt for `stage`.
    pub(super) fn from_outcome(stage: &'static str, outcome: StageOutcome) -> Option<Self> {
        outcome.is_vetoed().then(|| Self::new(stage, outcome.errors))
    }
}

/// Storage-assigned model fields, restored when a workflow does not commit.
pub(super) struct IdentitySnapshot {
    id: Option<RecordId>,
    date_created: Option<Timestamp>,
    date_updated: Option<Timestamp>,
    uid: Option<Uuid>,
}

impl IdentitySnapshot {
    pub(super) fn capture<M: Model>(model: &M) -> Self {
        let meta = model.meta();
        Self {
            id: meta.id,
            date_created: meta.date_created,
            date_updated: meta.date_updated,
            uid: meta.uid,
        }
    }

    pub(super) fn restore<M: Model>(self, model: &mut M) {
        let meta = model.meta_mut();
        meta.id = self.id;
        meta.date_created = self.date_created;
        meta.date_updated = self.date_updated;
        meta.uid = self.uid;
    }
}

/// Rolls back after a business rejection and reports `Ok(false)`.
pub(super) fn reject<T, M>(
    tx: T,
    model: &mut M,
    halt: Halt,
    event: &str,
    model_name: &str,
) -> ServiceResult<bool>
where
    T: TransactionScope,
    M: Model,
{
    model.add_errors(&halt.errors);
    tx.rollback()?;
    info!(
        "event={event} module=service status=rejected model={model_name} stage={} attributes={}",
        halt.stage,
        halt.errors.attribute_list()
    );
    Ok(false)
}

/// Rolls back after a fault and hands the original error back to the caller.
pub(super) fn abort<T>(tx: T, err: ServiceError, event: &str, model_name: &str) -> ServiceError
where
    T: TransactionScope,
{
    if let Err(rollback_err) = tx.rollback() {
        warn!(
            "event={event} module=service status=error model={model_name} error_code=rollback_failed error={rollback_err}"
        );
    }
    error!("event={event} module=service status=error model={model_name} error={err}");
    err
}

/// Logs a failed commit and converts it into the fault returned to the caller.
pub(super) fn commit_failed(err: GatewayError, event: &str, model_name: &str) -> ServiceError {
    error!("event={event} module=service status=error model={model_name} stage=commit error={err}");
    ServiceError::Gateway(err)
}

/// Formats an optional identifier for log events.
pub(super) fn display_id(id: Option<RecordId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}
