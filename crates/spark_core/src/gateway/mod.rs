//! Persistence gateway contracts.
//!
//! # Responsibility
//! - Abstract transaction scoping and record load/persist/delete so the
//!   orchestrator is parameterized by a gateway value.
//! - Keep storage query details behind a backend-neutral `Condition`.
//!
//! # Invariants
//! - `save_record`/`delete_record` report business rejection (constraint
//!   violations) as `Ok(false)` plus record errors; `Err` is a fault.
//! - A transaction that is dropped without `commit` is rolled back.

pub mod sqlite_section;

use crate::db::DbError;
use crate::record::{Record, RecordId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use sqlite_section::SqliteSectionGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Fault raised by a persistence gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Condition referenced a column the gateway does not expose.
    UnsupportedColumn(String),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "gateway requires schema version {expected_version}, got {actual_version}"
            ),
            Self::UnsupportedColumn(column) => {
                write!(f, "unsupported condition column `{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Scoped transaction handle.
///
/// Implementations must roll back when dropped without `commit`.
pub trait TransactionScope {
    fn commit(self) -> GatewayResult<()>;
    fn rollback(self) -> GatewayResult<()>;
}

impl TransactionScope for rusqlite::Transaction<'_> {
    fn commit(self) -> GatewayResult<()> {
        rusqlite::Transaction::commit(self)?;
        Ok(())
    }

    fn rollback(self) -> GatewayResult<()> {
        rusqlite::Transaction::rollback(self)?;
        Ok(())
    }
}

/// Scalar compared by a `Condition` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// AND-joined `column = value` predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    clauses: Vec<(String, ConditionValue)>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(
        mut self,
        column: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.clauses.push((column.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, ConditionValue)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Storage boundary used by `ModelService`.
pub trait PersistenceGateway {
    type Record: Record;
    type Transaction<'a>: TransactionScope
    where
        Self: 'a;

    /// Opens a transaction covering every gateway call until it finishes.
    fn begin_transaction(&self) -> GatewayResult<Self::Transaction<'_>>;

    fn fetch_by_id(&self, id: RecordId) -> GatewayResult<Option<Self::Record>>;

    /// Returns the first record matching `condition`, ordered by identifier.
    fn fetch_by_condition(&self, condition: &Condition) -> GatewayResult<Option<Self::Record>>;

    /// Inserts (no id) or updates (id set) `record`.
    ///
    /// On insert the gateway assigns id, uid and both timestamps onto the
    /// record; on update it refreshes `date_updated`. `attributes` limits
    /// which writable columns an update touches.
    fn save_record(
        &self,
        record: &mut Self::Record,
        attributes: Option<&[String]>,
    ) -> GatewayResult<bool>;

    fn delete_record(&self, record: &mut Self::Record) -> GatewayResult<bool>;
}
