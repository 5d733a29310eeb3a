//! Recording in-memory gateway shared by integration tests.
#![allow(dead_code)]

use spark_core::{
    Condition, ConditionValue, GatewayError, GatewayResult, Model, ModelBinding, ModelErrors,
    ModelEvent, ModelMeta, PersistenceGateway, Record, RecordId, RecordMeta, StageOutcome,
    TransactionScope,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const FAULT_MESSAGE: &str = "disk unavailable";
pub const COMMIT_FAULT_MESSAGE: &str = "commit failed";

/// Calls observed by `MockGateway`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Journal {
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub fetch_by_id: usize,
    pub fetch_by_condition: usize,
    pub saves: usize,
    pub deletes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRecord {
    pub meta: RecordMeta,
    pub key: String,
    pub label: String,
}

impl Record for WidgetRecord {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&mut self, _attributes: Option<&[String]>) -> bool {
        self.meta.errors.clear(None);
        if self.label.trim().is_empty() {
            self.meta.errors.add("name", "required");
        }
        self.meta.errors.is_empty()
    }

    fn string_attribute(&self, name: &str) -> Option<&str> {
        (name == "key").then_some(self.key.as_str())
    }
}

/// Model whose hooks can be told to veto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Widget {
    pub meta: ModelMeta,
    pub key: String,
    pub label: String,
    pub veto_before_save: bool,
    pub veto_after_save: bool,
    pub veto_before_delete: bool,
    pub veto_after_delete: bool,
}

impl Widget {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            ..Self::default()
        }
    }
}

fn veto_if(flag: bool, stage: &str) -> StageOutcome {
    if !flag {
        return StageOutcome::proceed();
    }
    let mut errors = ModelErrors::new();
    errors.add("hook", stage);
    StageOutcome::veto_with(errors)
}

impl Model for Widget {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ModelMeta {
        &mut self.meta
    }

    fn validate(&mut self, _attributes: Option<&[String]>) -> bool {
        self.meta.errors.clear(None);
        if self.key.trim().is_empty() {
            self.meta.errors.add("key", "required");
        }
        self.meta.errors.is_empty()
    }

    fn before_save(&mut self, _event: &ModelEvent) -> StageOutcome {
        veto_if(self.veto_before_save, "before_save")
    }

    fn after_save(&mut self, _event: &ModelEvent) -> StageOutcome {
        veto_if(self.veto_after_save, "after_save")
    }

    fn before_delete(&mut self, _event: &ModelEvent) -> StageOutcome {
        veto_if(self.veto_before_delete, "before_delete")
    }

    fn after_delete(&mut self, _event: &ModelEvent) -> StageOutcome {
        veto_if(self.veto_after_delete, "after_delete")
    }
}

/// Binding with a switchable service-level veto and an after-save counter.
#[derive(Debug, Default)]
pub struct WidgetBinding {
    pub veto_service_save: bool,
    pub veto_service_delete: bool,
    pub saved_notifications: Cell<usize>,
}

impl ModelBinding for WidgetBinding {
    type Model = Widget;
    type Record = WidgetRecord;

    fn model_name(&self) -> &'static str {
        "widget"
    }

    fn to_record(&self, model: &Widget, mirror_scenario: bool) -> WidgetRecord {
        let mut meta = model.meta.id.map_or_else(RecordMeta::new, RecordMeta::with_id);
        meta.uid = model.meta.uid;
        meta.date_created = model.meta.date_created;
        if mirror_scenario {
            meta.scenario = model.meta.scenario.clone();
        }
        WidgetRecord {
            meta,
            key: model.key.clone(),
            label: model.label.clone(),
        }
    }

    fn to_model(&self, record: WidgetRecord) -> Widget {
        let mut widget = Widget::new(&record.key, &record.label);
        widget.meta.id = record.id();
        widget.meta.uid = record.meta.uid;
        widget.meta.date_created = record.meta.date_created;
        widget.meta.date_updated = record.meta.date_updated;
        widget
    }

    fn string_property(&self) -> &'static str {
        "key"
    }

    fn string_value(&self, model: &Widget) -> Option<String> {
        (!model.key.is_empty()).then(|| model.key.clone())
    }

    fn before_save(&self, _model: &Widget, _is_new: bool) -> StageOutcome {
        veto_if(self.veto_service_save, "service_before_save")
    }

    fn after_save(&self, _model: &Widget, _is_new: bool) {
        self.saved_notifications.set(self.saved_notifications.get() + 1);
    }

    fn before_delete(&self, _model: &Widget) -> StageOutcome {
        veto_if(self.veto_service_delete, "service_before_delete")
    }
}

/// In-memory gateway with transactional staging and a call journal.
#[derive(Debug, Default)]
pub struct MockGateway {
    journal: RefCell<Journal>,
    committed: RefCell<BTreeMap<RecordId, WidgetRecord>>,
    staged: RefCell<Option<BTreeMap<RecordId, WidgetRecord>>>,
    clock: Cell<i64>,
    pub fault_on_save: Cell<bool>,
    pub fault_on_delete: Cell<bool>,
    pub fault_on_commit: Cell<bool>,
    pub reject_delete: Cell<bool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Journal {
        self.journal.borrow().clone()
    }

    /// Rows visible outside any transaction.
    pub fn committed(&self) -> BTreeMap<RecordId, WidgetRecord> {
        self.committed.borrow().clone()
    }

    /// Stores a row directly, bypassing transactions.
    pub fn seed(&self, key: &str, label: &str) -> RecordId {
        let id = self.committed.borrow().keys().max().map_or(1, |max| max + 1);
        let now = self.tick();
        let mut meta = RecordMeta::with_id(id);
        meta.uid = Some(Uuid::new_v4());
        meta.date_created = Some(now);
        meta.date_updated = Some(now);
        self.committed.borrow_mut().insert(
            id,
            WidgetRecord {
                meta,
                key: key.to_string(),
                label: label.to_string(),
            },
        );
        id
    }

    fn tick(&self) -> i64 {
        let next = self.clock.get() + 1_000;
        self.clock.set(next);
        next
    }

    fn with_rows<T>(&self, f: impl FnOnce(&mut BTreeMap<RecordId, WidgetRecord>) -> T) -> T {
        let mut staged = self.staged.borrow_mut();
        match staged.as_mut() {
            Some(rows) => f(rows),
            None => f(&mut *self.committed.borrow_mut()),
        }
    }

    fn finish(&self, commit: bool) {
        let staged = self.staged.borrow_mut().take();
        let mut journal = self.journal.borrow_mut();
        if commit {
            journal.commits += 1;
            if let Some(rows) = staged {
                *self.committed.borrow_mut() = rows;
            }
        } else {
            journal.rollbacks += 1;
        }
    }
}

pub struct MockTransaction<'a> {
    gateway: &'a MockGateway,
    finished: bool,
}

impl TransactionScope for MockTransaction<'_> {
    fn commit(mut self) -> GatewayResult<()> {
        self.finished = true;
        if self.gateway.fault_on_commit.get() {
            self.gateway.finish(false);
            return Err(GatewayError::InvalidData(COMMIT_FAULT_MESSAGE.to_string()));
        }
        self.gateway.finish(true);
        Ok(())
    }

    fn rollback(mut self) -> GatewayResult<()> {
        self.finished = true;
        self.gateway.finish(false);
        Ok(())
    }
}

impl Drop for MockTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.gateway.finish(false);
        }
    }
}

impl PersistenceGateway for MockGateway {
    type Record = WidgetRecord;
    type Transaction<'a>
        = MockTransaction<'a>
    where
        Self: 'a;

    fn begin_transaction(&self) -> GatewayResult<MockTransaction<'_>> {
        self.journal.borrow_mut().begins += 1;
        *self.staged.borrow_mut() = Some(self.committed.borrow().clone());
        Ok(MockTransaction {
            gateway: self,
            finished: false,
        })
    }

    fn fetch_by_id(&self, id: RecordId) -> GatewayResult<Option<WidgetRecord>> {
        self.journal.borrow_mut().fetch_by_id += 1;
        Ok(self.with_rows(|rows| rows.get(&id).cloned()))
    }

    fn fetch_by_condition(&self, condition: &Condition) -> GatewayResult<Option<WidgetRecord>> {
        self.journal.borrow_mut().fetch_by_condition += 1;
        let mut wanted = None;
        for (column, value) in condition.clauses() {
            match (column.as_str(), value) {
                ("key", ConditionValue::Text(text)) => wanted = Some(text.clone()),
                _ => return Err(GatewayError::UnsupportedColumn(column.clone())),
            }
        }
        Ok(self.with_rows(|rows| {
            rows.values()
                .find(|row| wanted.as_deref().map_or(true, |key| row.key == key))
                .cloned()
        }))
    }

    fn save_record(
        &self,
        record: &mut WidgetRecord,
        _attributes: Option<&[String]>,
    ) -> GatewayResult<bool> {
        self.journal.borrow_mut().saves += 1;
        if self.fault_on_save.get() {
            return Err(GatewayError::InvalidData(FAULT_MESSAGE.to_string()));
        }

        let now = self.tick();
        self.with_rows(|rows| {
            if record.id().is_none() {
                let id = rows.keys().max().map_or(1, |max| max + 1);
                record.meta.assign_id(id);
                record.meta.uid = Some(Uuid::new_v4());
                record.meta.date_created = Some(now);
            }
            record.meta.date_updated = Some(now);
            if let Some(id) = record.id() {
                rows.insert(id, record.clone());
            }
        });
        Ok(true)
    }

    fn delete_record(&self, record: &mut WidgetRecord) -> GatewayResult<bool> {
        self.journal.borrow_mut().deletes += 1;
        if self.fault_on_delete.get() {
            return Err(GatewayError::InvalidData(FAULT_MESSAGE.to_string()));
        }
        if self.reject_delete.get() {
            record.add_error("id", "in_use");
            return Ok(false);
        }
        let removed = record
            .id()
            .and_then(|id| self.with_rows(|rows| rows.remove(&id)));
        Ok(removed.is_some())
    }
}
