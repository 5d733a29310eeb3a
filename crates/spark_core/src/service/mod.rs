//! Model services: transactional save/delete orchestration and cached
//! string lookups.
//!
//! # Responsibility
//! - Drive the validate → before → persist → transfer → after lifecycle
//!   inside one scoped transaction.
//! - Resolve models by string key through a per-service cache.
//! - Keep entity-specific knowledge in `ModelBinding` implementations.

mod by_string;
pub mod model_service;
mod model_delete;
mod model_save;
pub mod section_service;

pub use model_service::{ModelBinding, ModelService, SaveOptions, ServiceError, ServiceResult};
pub use section_service::{SectionBinding, SectionService};
