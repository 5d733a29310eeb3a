//! SQLite-backed gateway for `sections` records.
//!
//! # Responsibility
//! - Persist, load and delete `SectionRecord`s inside scoped transactions.
//! - Translate constraint violations into record errors.
//!
//! # Invariants
//! - Write statements run on the borrowed connection, so they join any
//!   transaction opened through `begin_transaction`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::gateway::{Condition, ConditionValue, GatewayError, GatewayResult, PersistenceGateway};
use crate::model::attribute_selected;
use crate::record::section::SectionRecord;
use crate::record::{Record, RecordId, RecordMeta};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SECTION_SELECT_SQL: &str = "SELECT
    id,
    uid,
    handle,
    name,
    enabled,
    date_created,
    date_updated
FROM sections";

const QUERYABLE_COLUMNS: &[&str] = &[
    "id",
    "uid",
    "handle",
    "name",
    "enabled",
    "date_created",
    "date_updated",
];
/// Current time as epoch milliseconds, matching the migration defaults.
const NOW_MS_SQL: &str = "CAST(unixepoch('subsec') * 1000 AS INTEGER)";
const WRITABLE_COLUMNS: &[&str] = &["handle", "name", "enabled"];

pub const ERROR_TAKEN: &str = "taken";
pub const ERROR_IN_USE: &str = "in_use";
pub const ERROR_NOT_FOUND: &str = "not_found";
pub const ERROR_CONSTRAINT: &str = "constraint";

/// Section gateway over a borrowed, migrated SQLite connection.
pub struct SqliteSectionGateway<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionGateway<'conn> {
    /// Creates a gateway without checking the schema version.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a gateway after verifying migrations were applied.
    pub fn try_new(conn: &'conn Connection) -> GatewayResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(GatewayError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self::new(conn))
    }

    fn insert(&self, record: &mut SectionRecord) -> GatewayResult<bool> {
        let uid = record.meta.uid.unwrap_or_else(Uuid::new_v4);
        let inserted = self.conn.execute(
            "INSERT INTO sections (uid, handle, name, enabled)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                uid.to_string(),
                record.handle.as_str(),
                record.name.as_str(),
                bool_to_int(record.enabled),
            ],
        );
        if let Err(err) = inserted {
            return reject_on_constraint(err, record);
        }

        let id = self.conn.last_insert_rowid();
        let stored = self
            .load_by_id(id)?
            .ok_or_else(|| GatewayError::InvalidData(format!("inserted section {id} vanished")))?;

        record.meta.assign_id(id);
        record.meta.uid = stored.meta.uid;
        record.meta.date_created = stored.meta.date_created;
        record.meta.date_updated = stored.meta.date_updated;
        debug!("event=record_insert module=gateway status=ok table=sections id={id}");
        Ok(true)
    }

    fn update(
        &self,
        id: RecordId,
        record: &mut SectionRecord,
        attributes: Option<&[String]>,
    ) -> GatewayResult<bool> {
        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        for column in WRITABLE_COLUMNS
            .iter()
            .filter(|column| attribute_selected(attributes, column))
        {
            bind_values.push(match *column {
                "handle" => Value::Text(record.handle.clone()),
                "name" => Value::Text(record.name.clone()),
                _ => Value::Integer(bool_to_int(record.enabled)),
            });
            assignments.push(format!("{column} = ?{}", bind_values.len()));
        }
        assignments.push(format!("date_updated = {NOW_MS_SQL}"));
        bind_values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE sections SET {} WHERE id = ?{};",
            assignments.join(", "),
            bind_values.len()
        );
        let updated = self.conn.execute(&sql, params_from_iter(bind_values));
        let changed = match updated {
            Ok(changed) => changed,
            Err(err) => return reject_on_constraint(err, record),
        };
        if changed == 0 {
            record.add_error("id", ERROR_NOT_FOUND);
            return Ok(false);
        }

        let stored = self
            .load_by_id(id)?
            .ok_or_else(|| GatewayError::InvalidData(format!("updated section {id} vanished")))?;
        record.meta.date_updated = stored.meta.date_updated;
        debug!("event=record_update module=gateway status=ok table=sections id={id}");
        Ok(true)
    }

    fn load_by_id(&self, id: RecordId) -> GatewayResult<Option<SectionRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SECTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_section_row(row)?));
        }
        Ok(None)
    }
}

impl PersistenceGateway for SqliteSectionGateway<'_> {
    type Record = SectionRecord;
    type Transaction<'a>
        = Transaction<'a>
    where
        Self: 'a;

    fn begin_transaction(&self) -> GatewayResult<Self::Transaction<'_>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        Ok(tx)
    }

    fn fetch_by_id(&self, id: RecordId) -> GatewayResult<Option<SectionRecord>> {
        self.load_by_id(id)
    }

    fn fetch_by_condition(&self, condition: &Condition) -> GatewayResult<Option<SectionRecord>> {
        let mut sql = format!("{SECTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        for (column, value) in condition.clauses() {
            if !QUERYABLE_COLUMNS.contains(&column.as_str()) {
                return Err(GatewayError::UnsupportedColumn(column.clone()));
            }
            sql.push_str(&format!(" AND {column} = ?"));
            bind_values.push(condition_value_to_db(value));
        }
        sql.push_str(" ORDER BY id ASC LIMIT 1;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_section_row(row)?));
        }
        Ok(None)
    }

    fn save_record(
        &self,
        record: &mut SectionRecord,
        attributes: Option<&[String]>,
    ) -> GatewayResult<bool> {
        match record.id() {
            Some(id) => self.update(id, record, attributes),
            None => self.insert(record),
        }
    }

    fn delete_record(&self, record: &mut SectionRecord) -> GatewayResult<bool> {
        let Some(id) = record.id() else {
            record.add_error("id", ERROR_NOT_FOUND);
            return Ok(false);
        };

        let deleted = self.conn.execute("DELETE FROM sections WHERE id = ?1;", [id]);
        let changed = match deleted {
            Ok(changed) => changed,
            Err(err) => return reject_on_constraint(err, record),
        };
        if changed == 0 {
            record.add_error("id", ERROR_NOT_FOUND);
            return Ok(false);
        }

        debug!("event=record_delete module=gateway status=ok table=sections id={id}");
        Ok(true)
    }
}

/// Converts a constraint violation into a record error and `Ok(false)`.
///
/// Every other SQLite failure is returned as a fault.
fn reject_on_constraint(err: rusqlite::Error, record: &mut SectionRecord) -> GatewayResult<bool> {
    let err = DbError::Sqlite(err);
    if !err.is_constraint_violation() {
        return Err(err.into());
    }

    let (attribute, message) = constraint_error(&err);
    debug!(
        "event=record_rejected module=gateway status=rejected table=sections attribute={attribute} reason={message}"
    );
    record.add_error(attribute, message);
    Ok(false)
}

fn constraint_error(err: &DbError) -> (&'static str, &'static str) {
    let detail = match err {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(detail))) => detail.as_str(),
        _ => "",
    };
    if detail.contains("sections.handle") {
        ("handle", ERROR_TAKEN)
    } else if detail.contains("sections.uid") {
        ("uid", ERROR_TAKEN)
    } else if detail.contains("FOREIGN KEY") {
        ("id", ERROR_IN_USE)
    } else {
        ("id", ERROR_CONSTRAINT)
    }
}

fn parse_section_row(row: &Row<'_>) -> GatewayResult<SectionRecord> {
    let id: RecordId = row.get("id")?;

    let uid_text: String = row.get("uid")?;
    let uid = Uuid::parse_str(&uid_text).map_err(|_| {
        GatewayError::InvalidData(format!("invalid uid value `{uid_text}` in sections.uid"))
    })?;

    let enabled = match row.get::<_, i64>("enabled")? {
        0 => false,
        1 => true,
        other => {
            return Err(GatewayError::InvalidData(format!(
                "invalid enabled value `{other}` in sections.enabled"
            )));
        }
    };

    let mut meta = RecordMeta::with_id(id);
    meta.uid = Some(uid);
    meta.date_created = Some(row.get("date_created")?);
    meta.date_updated = Some(row.get("date_updated")?);

    Ok(SectionRecord {
        meta,
        handle: row.get("handle")?,
        name: row.get("name")?,
        enabled,
    })
}

fn condition_value_to_db(value: &ConditionValue) -> Value {
    match value {
        ConditionValue::Text(text) => Value::Text(text.clone()),
        ConditionValue::Integer(number) => Value::Integer(*number),
        ConditionValue::Bool(flag) => Value::Integer(bool_to_int(*flag)),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
