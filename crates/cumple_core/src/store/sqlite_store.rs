//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist JSON document bodies keyed by `(collection, id)`.
//! - Map SQLite outcomes onto the store contract (`Conflict`, `NotFound`).
//!
//! # Invariants
//! - Bodies are stored as JSON object text and re-validated on read.
//! - Listing order is deterministic: `created_at ASC, rowid ASC`.

use crate::db::migrations::{latest_version, schema_version};
use crate::model::document::{Document, StoredDocument};
use crate::store::{Collection, RecordStore, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde_json::Value;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT id, data FROM documents";
const DOCUMENT_ORDER_SQL: &str = "ORDER BY created_at ASC, rowid ASC";

/// Document store over one migrated SQLite connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `InvalidData` when the connection schema is not at the latest
    ///   version, i.e. it was not opened through the db bootstrap.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let found = schema_version(conn)?;
        let expected = latest_version();
        if found != expected {
            return Err(StoreError::InvalidData(format!(
                "document store requires schema version {expected}, got {found}"
            )));
        }
        Ok(Self { conn })
    }

    fn load(&self, collection: Collection, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.conn
            .query_row(
                &format!("{DOCUMENT_SELECT_SQL} WHERE collection = ?1 AND id = ?2;"),
                params![collection.as_str(), id],
                raw_row,
            )
            .optional()?
            .map(|(id, data)| parse_document(collection, id, &data))
            .transpose()
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn create_with_id(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
    ) -> StoreResult<()> {
        if id.trim().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "empty document id for collection `{collection}`"
            )));
        }

        let body = serde_json::to_string(data)?;
        let inserted = self.conn.execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3);",
            params![collection.as_str(), id, body],
        );

        match inserted {
            Ok(_) => {
                debug!("event=doc_create module=store status=ok collection={collection} id={id}");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict {
                    collection,
                    id: id.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn create(&self, collection: Collection, data: &Document) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.create_with_id(collection, &id, data)?;
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.load(collection, id)
    }

    fn update(&self, collection: Collection, id: &str, patch: &Document) -> StoreResult<()> {
        let mut current = self
            .load(collection, id)?
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        for (key, value) in patch {
            current.data.insert(key.clone(), value.clone());
        }

        let body = serde_json::to_string(&current.data)?;
        let changed = self.conn.execute(
            "UPDATE documents
             SET
                data = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2 AND id = ?3;",
            params![body, collection.as_str(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }

        debug!(
            "event=doc_update module=store status=ok collection={collection} id={id} fields={}",
            patch.len()
        );
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection.as_str(), id],
        )?;
        debug!(
            "event=doc_delete module=store status=ok collection={collection} id={id} removed={removed}"
        );
        Ok(())
    }

    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<StoredDocument>> {
        Ok(self
            .query_all(collection)?
            .into_iter()
            .filter(|doc| doc.data.get(field) == Some(value))
            .collect())
    }

    fn query_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL} WHERE collection = ?1 {DOCUMENT_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([collection.as_str()])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            let (id, data) = raw_row(row)?;
            documents.push(parse_document(collection, id, &data)?);
        }

        Ok(documents)
    }
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("id")?, row.get("data")?))
}

fn parse_document(collection: Collection, id: String, data: &str) -> StoreResult<StoredDocument> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(map) => Ok(StoredDocument::new(id, map)),
        _ => Err(StoreError::InvalidData(format!(
            "{collection}/{id} body is not a JSON object"
        ))),
    }
}
