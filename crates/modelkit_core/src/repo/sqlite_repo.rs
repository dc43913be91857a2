//! SQLite-backed persistence for model records.
//!
//! # Responsibility
//! - Store the merged attributes of saved instances as JSON rows.
//! - Assign a stable `id` to instances saved without one.
//!
//! # Invariants
//! - Rows are keyed by `(model_name, record_id)`, where `record_id` is the
//!   JSON encoding of the `id` value: `7` and `"7"` are different records.
//! - The model is only mutated (generated `id`) after the row write succeeded.
//! - SQL failures are logged and reported as `false`; they never panic.

use crate::db::{open_db, open_db_in_memory};
use crate::model::attributes::Attributes;
use crate::model::instance::{Model, ID_ATTRIBUTE};
use crate::repo::{Completion, PersistenceBackend, RepoError, RepoResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Persistence backend writing to one SQLite connection.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Reads stored attributes for the record whose `id` equals `id`.
    pub fn fetch(&self, model_name: &str, id: &Value) -> RepoResult<Option<Attributes>> {
        let record_id = record_id_text(id).ok_or_else(|| {
            RepoError::InvalidData(format!("unsupported record id `{id}`"))
        })?;
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT attributes_json FROM model_records
                 WHERE model_name = ?1 AND record_id = ?2;",
                params![model_name, record_id],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(text) => match serde_json::from_str::<Value>(&text)? {
                Value::Object(attributes) => Ok(Some(attributes)),
                other => Err(RepoError::InvalidData(format!(
                    "expected JSON object in model_records.attributes_json, got `{other}`"
                ))),
            },
            None => Ok(None),
        }
    }

    /// Number of stored records for one model type name.
    pub fn count(&self, model_name: &str) -> RepoResult<u64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM model_records WHERE model_name = ?1;",
            [model_name],
            |row| row.get::<_, i64>(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative record count `{count}`")))
    }

    fn write_record(
        &self,
        model_name: &str,
        record_id: &str,
        attributes: &Attributes,
    ) -> RepoResult<()> {
        let json = serde_json::to_string(attributes)?;
        self.conn.execute(
            "INSERT INTO model_records (model_name, record_id, attributes_json)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(model_name, record_id) DO UPDATE SET
                attributes_json = excluded.attributes_json,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![model_name, record_id, json],
        )?;
        Ok(())
    }

    fn delete_record(&self, model_name: &str, record_id: &str) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM model_records WHERE model_name = ?1 AND record_id = ?2;",
            params![model_name, record_id],
        )?;
        Ok(deleted)
    }
}

impl PersistenceBackend for SqliteBackend {
    fn save(&self, model: &Model, done: Completion) {
        let started_at = Instant::now();
        let model_name = model.type_name().to_string();
        let mut attributes = model.get_all();

        let (id, generated) = match model.id() {
            Some(id) => (id, false),
            None => (Value::String(Uuid::new_v4().to_string()), true),
        };
        let Some(record_key) = record_id_text(&id) else {
            error!(
                "event=backend_save module=repo status=error backend=sqlite model={} error_code=unsupported_id_type",
                model_name
            );
            done(false);
            return;
        };
        if generated {
            attributes.insert(ID_ATTRIBUTE.to_string(), id.clone());
        }

        match self.write_record(&model_name, &record_key, &attributes) {
            Ok(()) => {
                info!(
                    "event=backend_save module=repo status=ok backend=sqlite model={} generated_id={} duration_ms={}",
                    model_name,
                    generated,
                    started_at.elapsed().as_millis()
                );
                if generated {
                    model.set(ID_ATTRIBUTE, id);
                }
                done(true);
            }
            Err(err) => {
                error!(
                    "event=backend_save module=repo status=error backend=sqlite model={} duration_ms={} error_code=write_failed error={}",
                    model_name,
                    started_at.elapsed().as_millis(),
                    err
                );
                done(false);
            }
        }
    }

    fn destroy(&self, model: &Model, done: Completion) {
        let model_name = model.type_name().to_string();
        // Nothing was ever written for an instance without an id.
        let Some(record_id) = model.id().as_ref().and_then(record_id_text) else {
            done(true);
            return;
        };

        match self.delete_record(&model_name, &record_id) {
            Ok(deleted) => {
                info!(
                    "event=backend_destroy module=repo status=ok backend=sqlite model={} deleted_rows={}",
                    model_name, deleted
                );
                done(true);
            }
            Err(err) => {
                error!(
                    "event=backend_destroy module=repo status=error backend=sqlite model={} error_code=delete_failed error={}",
                    model_name, err
                );
                done(false);
            }
        }
    }
}

/// JSON text of a non-empty string or number id.
fn record_id_text(id: &Value) -> Option<String> {
    match id {
        Value::String(text) if text.is_empty() => None,
        Value::String(_) | Value::Number(_) => serde_json::to_string(id).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::record_id_text;
    use serde_json::json;

    #[test]
    fn record_ids_accept_strings_and_numbers_only() {
        assert_eq!(record_id_text(&json!("abc")), Some("\"abc\"".to_string()));
        assert_eq!(record_id_text(&json!(42)), Some("42".to_string()));
        assert_ne!(record_id_text(&json!(7)), record_id_text(&json!("7")));
        assert_eq!(record_id_text(&json!("")), None);
        assert_eq!(record_id_text(&json!(null)), None);
        assert_eq!(record_id_text(&json!([1])), None);
    }
}
