use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use chrono::Utc;
use tracing::{debug, info};

use super::data::ImageRecord;
use crate::error::Result;

/// Default catalog file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "diseases_db.db";

const SELECT_COLUMNS: &str = "SELECT id, disease_name, file_name, image, upload_time FROM disease_images";

/// The RecordStore manages the SQLite catalog of uploaded disease images.
///
/// Every call runs in SQLite autocommit mode, so each mutation is durable
/// once it returns. A store owns one connection; concurrent sessions open
/// their own store and rely on SQLite's file locking.
pub struct RecordStore {
    conn: Connection,
    db_path: PathBuf,
}

impl RecordStore {
    /// Open (or create) the catalog at `db_path` and make sure the table exists.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        debug!(path = %db_path.display(), "catalog opened");

        let store = RecordStore { conn, db_path };
        store.initialize()?;

        Ok(store)
    }

    /// Create the images table if it doesn't exist. Safe to call on every request.
    ///
    /// AUTOINCREMENT keeps ids monotonic: SQLite never hands out an id
    /// that was used by a deleted row.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS disease_images (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                disease_name    TEXT NOT NULL,
                file_name       TEXT NOT NULL,
                image           BLOB NOT NULL,
                upload_time     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a count of stored images
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM disease_images",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Store a new upload and return its id.
    /// `image_bytes` must be the complete file content.
    pub fn create(&self, disease_name: &str, file_name: &str, image_bytes: &[u8]) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO disease_images (disease_name, file_name, image, upload_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![disease_name, file_name, image_bytes, Utc::now()],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, disease_name, file_name, bytes = image_bytes.len(), "image stored");
        Ok(id)
    }

    /// Get every stored image in insertion order.
    ///
    /// No pagination: the whole table, payloads included, is loaded at once.
    pub fn list_all(&self) -> Result<Vec<ImageRecord>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Look up one image; `None` when no record has this id.
    pub fn get(&self, id: i64) -> Result<Option<ImageRecord>> {
        let record = self
            .conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], record_from_row)
            .optional()?;
        Ok(record)
    }

    /// Rename the disease label of an image. Unknown ids are a silent no-op.
    pub fn update_disease_name(&self, id: i64, new_name: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE disease_images SET disease_name = ?1 WHERE id = ?2",
            params![new_name, id],
        )?;
        debug!(id, new_name, changed, "disease name updated");
        Ok(())
    }

    /// Remove an image. Unknown ids are a silent no-op.
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM disease_images WHERE id = ?1", [id])?;
        debug!(id, changed, "image deleted");
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        disease_name: row.get(1)?,
        file_name: row.get(2)?,
        image_bytes: row.get(3)?,
        upload_time: row.get(4)?,
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, RecordStore) {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(tmp.path().join("diseases_db.db")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_tmp, store) = test_store();
        let id = store.create("Measles", "a.jpg", b"bytes").unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get(id).unwrap().is_some());
    }

    #[test]
    fn test_open_creates_missing_parent_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("catalog.db");
        let store = RecordStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_open_non_database_file_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.db");
        std::fs::write(&path, vec![0x42u8; 8 * 1024]).unwrap();

        let err = RecordStore::open(&path).unwrap_err();

        assert!(matches!(err, crate::error::Error::Storage(_)));
        assert!(err.is_storage());
    }

    #[test]
    fn test_create_then_get() {
        let (_tmp, store) = test_store();
        let bytes = vec![0xFF, 0xD8, 0x00, 0x42, 0xFF, 0xD9];
        let before = Utc::now();

        let id = store.create("Chickenpox", "spots.png", &bytes).unwrap();
        let record = store.get(id).unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.disease_name, "Chickenpox");
        assert_eq!(record.file_name, "spots.png");
        assert_eq!(record.image_bytes, bytes);
        assert!(record.upload_time >= before);
        assert!(record.upload_time <= Utc::now());
    }

    #[test]
    fn test_ids_are_unique() {
        let (_tmp, store) = test_store();
        let a = store.create("A", "a.jpg", b"a").unwrap();
        let b = store.create("B", "b.jpg", b"b").unwrap();
        let c = store.create("A", "a.jpg", b"a").unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_tmp, store) = test_store();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        let (_tmp, store) = test_store();
        let first = store.create("Measles", "1.jpg", b"1").unwrap();
        let second = store.create("Mumps", "2.jpg", b"2").unwrap();
        let third = store.create("Rubella", "3.jpg", b"3").unwrap();

        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn test_update_twice_is_idempotent() {
        let (_tmp, store) = test_store();
        let id = store.create("Measles", "a.jpg", b"B").unwrap();

        store.update_disease_name(id, "X").unwrap();
        store.update_disease_name(id, "X").unwrap();

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.disease_name, "X");
        assert_eq!(record.file_name, "a.jpg");
        assert_eq!(record.image_bytes, b"B");
    }

    // Deliberate contract: unknown ids are ignored rather than reported.
    #[test]
    fn test_update_missing_id_is_noop() {
        let (_tmp, store) = test_store();
        store.create("Measles", "a.jpg", b"B").unwrap();
        let before = store.list_all().unwrap();

        store.update_disease_name(999, "Rubella").unwrap();

        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let (_tmp, store) = test_store();
        store.create("Measles", "a.jpg", b"B").unwrap();
        let before = store.list_all().unwrap();

        store.delete(999).unwrap();

        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_delete_then_absent() {
        let (_tmp, store) = test_store();
        let id = store.create("Measles", "a.jpg", b"B").unwrap();
        let other = store.create("Mumps", "b.jpg", b"C").unwrap();

        store.delete(id).unwrap();

        assert!(store.get(id).unwrap().is_none());
        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![other]);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (_tmp, store) = test_store();
        let mut highest = 0;

        for round in 0..5 {
            let a = store.create("A", "a.jpg", b"a").unwrap();
            let b = store.create("B", "b.jpg", b"b").unwrap();
            assert!(a > highest);
            assert!(b > a);
            highest = b;

            // Deleting the newest row must not free its id
            store.delete(b).unwrap();
            if round % 2 == 0 {
                store.delete(a).unwrap();
            }
        }

        let c = store.create("C", "c.jpg", b"c").unwrap();
        assert!(c > highest);
        assert!(store.list_all().unwrap().iter().all(|r| r.id != highest));
    }

    #[test]
    fn test_ids_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diseases_db.db");

        let last = {
            let store = RecordStore::open(&path).unwrap();
            let id = store.create("Measles", "a.jpg", b"a").unwrap();
            store.delete(id).unwrap();
            id
        };

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.create("Mumps", "b.jpg", b"b").unwrap() > last);
    }

    #[test]
    fn test_separate_connections_see_commits() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diseases_db.db");
        let writer = RecordStore::open(&path).unwrap();
        let reader = RecordStore::open(&path).unwrap();

        let id = writer.create("Measles", "a.jpg", b"a").unwrap();
        writer.update_disease_name(id, "Rubella").unwrap();

        let record = reader.get(id).unwrap().unwrap();
        assert_eq!(record.disease_name, "Rubella");
    }

    #[test]
    fn test_reads_rows_with_default_timestamp() {
        let (_tmp, store) = test_store();
        store
            .conn
            .execute(
                "INSERT INTO disease_images (disease_name, file_name, image) VALUES ('Flu', 'f.jpg', x'00')",
                [],
            )
            .unwrap();

        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].disease_name, "Flu");
    }
}
