//! Transactional delete workflow.

use super::model_service::{
    abort, commit_failed, display_id, reject, Halt, ModelBinding, ModelService, ServiceError,
    ServiceResult,
};
use crate::gateway::{PersistenceGateway, TransactionScope};
use crate::model::{Model, ModelEvent};
use crate::record::Record;
use log::info;

const DELETE_EVENT: &str = "model_delete";

impl<G, B> ModelService<G, B>
where
    G: PersistenceGateway,
    B: ModelBinding<Record = G::Record>,
{
    /// Deletes the record behind `model` in one transaction.
    ///
    /// Returns `Ok(false)` when a hook vetoed or storage refused the delete
    /// (errors attached to the model, nothing removed). Deleting a model
    /// without identifier, or whose record is gone, is a fault.
    pub fn delete(&self, model: &mut B::Model) -> ServiceResult<bool> {
        let model_name = self.binding.model_name();

        let outcome = self.binding.before_delete(model);
        if outcome.is_vetoed() {
            model.add_errors(&outcome.errors);
            info!(
                "event={DELETE_EVENT} module=service status=rejected model={model_name} stage=service_before_delete"
            );
            return Ok(false);
        }

        let event = ModelEvent::new(model.is_new());
        let tx = self.gateway.begin_transaction()?;

        match self.delete_in_transaction(model, &event) {
            Ok(None) => {}
            Ok(Some(halt)) => return reject(tx, model, halt, DELETE_EVENT, model_name),
            Err(err) => return Err(abort(tx, err, DELETE_EVENT, model_name)),
        }

        if let Err(err) = tx.commit() {
            return Err(commit_failed(err, DELETE_EVENT, model_name));
        }
        info!(
            "event={DELETE_EVENT} module=service status=ok model={model_name} id={}",
            display_id(model.id())
        );
        Ok(true)
    }

    fn delete_in_transaction(
        &self,
        model: &mut B::Model,
        event: &ModelEvent,
    ) -> ServiceResult<Option<Halt>> {
        if let Some(halt) = Halt::from_outcome("before_delete", model.before_delete(event)) {
            return Ok(Some(halt));
        }

        let id = model.id().ok_or(ServiceError::Unsaved)?;
        let mut record = self.get_record_by_id(id)?;

        if !self.gateway.delete_record(&mut record)? {
            return Ok(Some(Halt::new("record_delete", record.errors().clone())));
        }

        Ok(Halt::from_outcome("after_delete", model.after_delete(event)))
    }
}
