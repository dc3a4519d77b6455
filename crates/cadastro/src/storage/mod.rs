//! Document store for cadastro.
//!
//! Screens talk to the store only through the [`DocumentStore`] trait:
//! create a record in a collection, or query a collection by one field's
//! value. [`SqliteStore`] implements it on a local `SQLite` database with
//! JSON payloads.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Collection, Document, RecordId};

/// Persistence boundary used by the screens.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new record and return its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written. Nothing is
    /// stored in that case.
    async fn create(&self, collection: Collection, payload: serde_json::Value)
        -> Result<RecordId>;

    /// Return every record in `collection` whose `field` equals `value`.
    ///
    /// Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or `field` is not a plain
    /// identifier.
    async fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>>;
}

/// `SQLite`-backed document store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: Collection) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection.name()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("document store connection poisoned"))
    }

    fn insert(&self, collection: Collection, payload: &serde_json::Value) -> Result<RecordId> {
        if !payload.is_object() {
            return Err(Error::store_write(
                collection.name(),
                "payload must be a JSON object",
            ));
        }

        let id = RecordId::generate();
        let body = serde_json::to_string(payload)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (id, collection, payload) VALUES (?1, ?2, ?3)",
            params![id.as_str(), collection.name(), body],
        )
        .map_err(|e| Error::store_write(collection.name(), e.to_string()))?;

        debug!(collection = %collection, id = %id, "Inserted document");
        Ok(id)
    }

    fn select_eq(&self, collection: Collection, field: &str, value: &str) -> Result<Vec<Document>> {
        if !is_plain_field(field) {
            return Err(Error::InvalidField {
                field: field.to_string(),
            });
        }
        let json_path = format!("$.{field}");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r"
            SELECT id, payload FROM documents
            WHERE collection = ?1 AND json_extract(payload, ?2) = ?3
            ORDER BY seq ASC
            ",
        )?;

        let rows = stmt
            .query_map(params![collection.name(), json_path, value], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let documents = rows
            .into_iter()
            .map(|(id, payload)| {
                Ok(Document {
                    id: RecordId::new(id),
                    data: serde_json::from_str(&payload)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            collection = %collection,
            field,
            matches = documents.len(),
            "Queried documents"
        );
        Ok(documents)
    }
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    async fn create(
        &self,
        collection: Collection,
        payload: serde_json::Value,
    ) -> Result<RecordId> {
        self.insert(collection, &payload)
    }

    async fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        self.select_eq(collection, field, value)
    }
}

/// Whether `field` can be spliced into a JSON path as-is.
fn is_plain_field(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[tokio::test]
    async fn test_create_and_query() {
        let store = create_test_store();
        let id = store
            .create(Collection::Devices, json!({ "nome": "Pixel", "userId": "u1" }))
            .await
            .unwrap();

        let docs = store
            .query_eq(Collection::Devices, "userId", "u1")
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].data["nome"], "Pixel");
    }

    #[tokio::test]
    async fn test_query_only_returns_matching_owner() {
        let store = create_test_store();
        store
            .create(Collection::Devices, json!({ "nome": "A", "userId": "u1" }))
            .await
            .unwrap();
        store
            .create(Collection::Devices, json!({ "nome": "B", "userId": "u2" }))
            .await
            .unwrap();

        let docs = store
            .query_eq(Collection::Devices, "userId", "u2")
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["nome"], "B");
    }

    #[tokio::test]
    async fn test_query_is_scoped_to_collection() {
        let store = create_test_store();
        store
            .create(Collection::Formularios, json!({ "nome": "A", "userId": "u1" }))
            .await
            .unwrap();

        let docs = store
            .query_eq(Collection::Devices, "userId", "u1")
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_unsafe_field() {
        let store = create_test_store();
        let err = store
            .query_eq(Collection::Devices, "userId') OR 1=1 --", "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let store = create_test_store();
        let err = store
            .create(Collection::Devices, json!(["not", "an", "object"]))
            .await
            .unwrap_err();
        assert!(err.is_store_write());
        assert_eq!(store.count(Collection::Devices).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_per_collection() {
        let store = create_test_store();
        for i in 0..3 {
            store
                .create(Collection::Devices, json!({ "n": i, "userId": "u1" }))
                .await
                .unwrap();
        }
        store
            .create(Collection::Formularios, json!({ "userId": "u1" }))
            .await
            .unwrap();

        assert_eq!(store.count(Collection::Devices).unwrap(), 3);
        assert_eq!(store.count(Collection::Formularios).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_preserves_insertion_order() {
        let store = create_test_store();
        let first = store
            .create(Collection::Devices, json!({ "userId": "u1" }))
            .await
            .unwrap();
        let second = store
            .create(Collection::Devices, json!({ "userId": "u1" }))
            .await
            .unwrap();

        let ids: Vec<RecordId> = store
            .query_eq(Collection::Devices, "userId", "u1")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_is_plain_field() {
        assert!(is_plain_field("userId"));
        assert!(is_plain_field("numero_serie"));
        assert!(!is_plain_field(""));
        assert!(!is_plain_field("1abc"));
        assert!(!is_plain_field("a.b"));
        assert!(!is_plain_field("a'b"));
    }

    #[test]
    fn test_path() {
        assert_eq!(create_test_store().path().to_string_lossy(), ":memory:");
    }

    #[tokio::test]
    async fn test_open_file_based_persists() {
        let db_path = std::env::temp_dir().join(format!(
            "cadastro_store_test_{}/documents.db",
            std::process::id()
        ));
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = SqliteStore::open(&db_path).unwrap();
        store
            .create(Collection::Devices, json!({ "userId": "u1" }))
            .await
            .unwrap();
        drop(store);

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(reopened.count(Collection::Devices).unwrap(), 1);
        assert_eq!(reopened.path(), db_path);

        drop(reopened);
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }
}
