//! Find/get models by string key, with and without the service cache.

use super::model_service::{ModelBinding, ModelService, ServiceError, ServiceResult};
use crate::cache::CacheLookup;
use crate::gateway::{Condition, PersistenceGateway};
use crate::record::Record;
use log::debug;
use std::rc::Rc;

impl<G, B> ModelService<G, B>
where
    G: PersistenceGateway,
    B: ModelBinding<Record = G::Record>,
{
    /// Resolves a model by string key, consulting the cache first.
    ///
    /// A key confirmed absent stays absent without new queries until it is
    /// invalidated. Repeated hits return the same `Rc`.
    pub fn find_by_string(&mut self, key: &str) -> ServiceResult<Option<Rc<B::Model>>> {
        match self.string_cache.lookup(key) {
            CacheLookup::Hit(model) => return Ok(Some(model)),
            CacheLookup::Absent => return Ok(None),
            CacheLookup::Miss => {}
        }

        let Some(record) = self.find_record_by_string(key)? else {
            self.string_cache.insert_absent(key);
            debug!(
                "event=cache_fill module=service status=absent model={} key_len={}",
                self.binding.model_name(),
                key.len()
            );
            return Ok(None);
        };

        let model = Rc::new(self.binding.to_model(record));
        self.string_cache.insert_found(key, Rc::clone(&model));
        self.cache_by_string(Rc::clone(&model));
        debug!(
            "event=cache_fill module=service status=found model={}",
            self.binding.model_name()
        );
        Ok(Some(model))
    }

    /// Like `find_by_string`, failing with `ServiceError::NotFound`.
    pub fn get_by_string(&mut self, key: &str) -> ServiceResult<Rc<B::Model>> {
        self.find_by_string(key)?
            .ok_or_else(|| self.not_found_by_string(key))
    }

    /// Queries storage directly; never reads or writes the cache.
    pub fn fresh_find_by_string(&self, key: &str) -> ServiceResult<Option<B::Model>> {
        Ok(self
            .find_record_by_string(key)?
            .map(|record| self.binding.to_model(record)))
    }

    /// Like `fresh_find_by_string`, failing with `ServiceError::NotFound`.
    pub fn fresh_get_by_string(&self, key: &str) -> ServiceResult<B::Model> {
        self.fresh_find_by_string(key)?
            .ok_or_else(|| self.not_found_by_string(key))
    }

    /// Probes the cache without touching storage.
    pub fn find_cache_by_string(&self, key: &str) -> CacheLookup<B::Model> {
        self.string_cache.lookup(key)
    }

    /// Caches `model` under its own string value.
    ///
    /// Returns `false` when the model has no string value or the key was
    /// already resolved.
    pub fn cache_by_string(&mut self, model: Rc<B::Model>) -> bool {
        match self.binding.string_value(&model) {
            Some(key) => self.string_cache.insert_found(key, model),
            None => false,
        }
    }

    /// Resolves a cached model through the record's string column.
    pub fn find_cache_by_record(&self, record: &G::Record) -> Option<Rc<B::Model>> {
        let key = record.string_attribute(self.binding.record_string_property())?;
        self.string_cache.lookup(key).into_model()
    }

    pub fn find_record_by_string(&self, key: &str) -> ServiceResult<Option<G::Record>> {
        let condition = Condition::new().where_eq(self.binding.record_string_property(), key);
        Ok(self.gateway.fetch_by_condition(&condition)?)
    }

    pub fn get_record_by_string(&self, key: &str) -> ServiceResult<G::Record> {
        self.find_record_by_string(key)?
            .ok_or_else(|| ServiceError::RecordNotFound {
                property: self.binding.record_string_property(),
                value: key.to_string(),
            })
    }

    /// Forgets one key so the next cached lookup queries storage.
    pub fn invalidate_string(&mut self, key: &str) -> bool {
        self.string_cache.invalidate(key)
    }

    pub fn clear_string_cache(&mut self) {
        self.string_cache.clear();
    }

    fn not_found_by_string(&self, key: &str) -> ServiceError {
        ServiceError::NotFound {
            property: self.binding.string_property(),
            value: key.to_string(),
        }
    }
}
