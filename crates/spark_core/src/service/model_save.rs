//! Transactional save workflow.

use super::model_service::{
    abort, commit_failed, display_id, reject, Halt, IdentitySnapshot, ModelBinding, ModelService,
    SaveOptions, ServiceResult,
};
use crate::gateway::{PersistenceGateway, TransactionScope};
use crate::model::{Model, ModelEvent};
use crate::record::Record;
use log::info;

const SAVE_EVENT: &str = "model_save";

impl<G, B> ModelService<G, B>
where
    G: PersistenceGateway,
    B: ModelBinding<Record = G::Record>,
{
    /// Validates and persists `model` in one transaction.
    ///
    /// Returns `Ok(true)` after commit, `Ok(false)` when validation, a hook
    /// or storage rejected the model (errors are attached to it and nothing
    /// is written), and `Err` for faults after rolling back.
    ///
    /// # Side effects
    /// - New models receive id, uid and timestamps from the stored record.
    /// - Storage-assigned fields are restored when the workflow does not
    ///   commit.
    pub fn save(&self, model: &mut B::Model, options: &SaveOptions) -> ServiceResult<bool> {
        let model_name = self.binding.model_name();

        if options.run_validation && !model.validate(options.attributes.as_deref()) {
            info!(
                "event={SAVE_EVENT} module=service status=rejected model={model_name} stage=validate attributes={}",
                model.errors().attribute_list()
            );
            return Ok(false);
        }

        let is_new = model.is_new();
        let outcome = self.binding.before_save(model, is_new);
        if outcome.is_vetoed() {
            model.add_errors(&outcome.errors);
            info!(
                "event={SAVE_EVENT} module=service status=rejected model={model_name} stage=service_before_save"
            );
            return Ok(false);
        }

        let snapshot = IdentitySnapshot::capture(model);
        let event = ModelEvent::new(is_new);
        let tx = self.gateway.begin_transaction()?;

        match self.save_in_transaction(model, &event, options) {
            Ok(None) => {}
            Ok(Some(halt)) => {
                snapshot.restore(model);
                return reject(tx, model, halt, SAVE_EVENT, model_name);
            }
            Err(err) => {
                snapshot.restore(model);
                return Err(abort(tx, err, SAVE_EVENT, model_name));
            }
        }

        if let Err(err) = tx.commit() {
            snapshot.restore(model);
            return Err(commit_failed(err, SAVE_EVENT, model_name));
        }
        self.binding.after_save(model, is_new);
        info!(
            "event={SAVE_EVENT} module=service status=ok model={model_name} is_new={is_new} id={}",
            display_id(model.id())
        );
        Ok(true)
    }

    fn save_in_transaction(
        &self,
        model: &mut B::Model,
        event: &ModelEvent,
        options: &SaveOptions,
    ) -> ServiceResult<Option<Halt>> {
        let attributes = options.attributes.as_deref();

        if let Some(halt) = Halt::from_outcome("before_save", model.before_save(event)) {
            return Ok(Some(halt));
        }

        let mut record = self.binding.to_record(model, options.mirror_scenario);
        if !record.validate(attributes) {
            return Ok(Some(Halt::new("record_validate", record.errors().clone())));
        }

        if !self.gateway.save_record(&mut record, attributes)? {
            return Ok(Some(Halt::new("record_save", record.errors().clone())));
        }

        self.binding.transfer_from_record(model, &record, event.is_new);

        Ok(Halt::from_outcome("after_save", model.after_save(event)))
    }
}
