use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use timesheet_core::{Dimension, DimensionId, JoinedRecord, NewRecord};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::schema;

/// File-backed SQLite store.
///
/// The store itself only remembers where the database lives. Every unit of
/// work opens a [`StoreSession`], which owns the connection and closes it
/// when dropped, so no descriptor outlives the operation that needed it.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and every missing table.
    ///
    /// Idempotent: existing tables and rows are left untouched, so this is
    /// safe to call on every process start.
    pub fn initialize(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let session = self.open()?;
        schema::create_tables(&session.conn)?;
        info!("Database initialized at {}", self.path.display());
        Ok(())
    }

    /// Open a session on the database file.
    pub fn open(&self) -> Result<StoreSession, StorageError> {
        let conn = Connection::open(&self.path).map_err(|source| StorageError::Connection {
            path: self.path.clone(),
            source,
        })?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        debug!(path = %self.path.display(), "database session opened");
        Ok(StoreSession { conn })
    }

    /// Run `f` inside a fresh session. The connection is released on every
    /// exit path, including when `f` fails.
    pub fn with_session<T>(
        &self,
        f: impl FnOnce(&StoreSession) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let session = self.open()?;
        f(&session)
    }

    /// Every stored record with dimension names substituted for ids.
    pub fn fetch_all_joined(&self) -> Result<Vec<JoinedRecord>, StorageError> {
        self.with_session(|s| s.fetch_all_joined())
    }
}

/// An open connection to the store. Dropping it closes the connection.
pub struct StoreSession {
    conn: Connection,
}

const JOINED_QUERY: &str = "
    SELECT
        r.id,
        r.date,
        t.name AS technician,
        c.name AS client,
        tt.name AS task_type,
        r.completion_mode,
        r.ticket_number,
        r.hours,
        r.description,
        r.month
    FROM records r
    JOIN technicians t ON r.technician_id = t.id
    JOIN clients c ON r.client_id = c.id
    JOIN task_types tt ON r.task_type_id = tt.id
    ORDER BY r.id";

impl StoreSession {
    /// Return the id for `name` in the given dimension table, inserting a new
    /// row on first sight.
    ///
    /// Lookup and insert are two statements; concurrent writers resolving
    /// the same new name can race into a uniqueness violation.
    pub fn lookup_or_insert(
        &self,
        dimension: Dimension,
        name: &str,
    ) -> Result<DimensionId, StorageError> {
        let table = dimension.table();
        let existing = self
            .conn
            .query_row(
                &format!("SELECT id FROM {} WHERE name = ?1", table),
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", table),
            params![name],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(dimension = %dimension, name, id, "dimension row created");
        Ok(id)
    }

    /// Insert one fact row.
    ///
    /// Returns `Ok(false)` when a constraint (foreign key, `hours >= 0`,
    /// not-null) rejects the row; the store is unchanged for that row.
    /// Any other SQLite failure is an error.
    pub fn insert_record(&self, record: &NewRecord<'_>) -> Result<bool, StorageError> {
        let result = self.conn.execute(
            "INSERT INTO records (
                date, technician_id, client_id, task_type_id,
                completion_mode, ticket_number, hours, description, month
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.date,
                record.technician_id,
                record.client_id,
                record.task_type_id,
                record.completion_mode,
                record.ticket_number,
                record.hours,
                record.description,
                record.month,
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                warn!(error = %e, date = %record.date, "record rejected by constraint");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every stored record joined with its dimension names, in insertion order.
    pub fn fetch_all_joined(&self) -> Result<Vec<JoinedRecord>, StorageError> {
        let mut stmt = self.conn.prepare(JOINED_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(JoinedRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                technician: row.get(2)?,
                client: row.get(3)?,
                task_type: row.get(4)?,
                completion_mode: row.get(5)?,
                ticket_number: row.get(6)?,
                hours: row.get(7)?,
                description: row.get(8)?,
                month: row.get(9)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All names stored in a dimension table, alphabetically.
    pub fn dimension_names(&self, dimension: Dimension) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT name FROM {} ORDER BY name", dimension.table()))?;
        let names = stmt.query_map([], |row| row.get(0))?;
        Ok(names.collect::<Result<Vec<String>, _>>()?)
    }

    pub fn count_records(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?)
    }
}

impl Drop for StoreSession {
    fn drop(&mut self) {
        debug!("database session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("timesheet.db"));
        store.initialize().unwrap();
        (dir, store)
    }

    fn record(tech: i64, client: i64, task: i64, hours: f64) -> NewRecord<'static> {
        NewRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            technician_id: tech,
            client_id: client,
            task_type_id: task,
            completion_mode: Some("Remote"),
            ticket_number: Some("T-100"),
            hours,
            description: None,
            month: 3,
        }
    }

    #[test]
    fn lookup_or_insert_is_idempotent() {
        let (_dir, store) = store();
        let session = store.open().unwrap();

        let first = session.lookup_or_insert(Dimension::Technician, "Ana").unwrap();
        let second = session.lookup_or_insert(Dimension::Technician, "Ana").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            session.dimension_names(Dimension::Technician).unwrap(),
            vec!["Ana".to_string()]
        );
    }

    #[test]
    fn dimensions_are_independent_tables() {
        let (_dir, store) = store();
        let session = store.open().unwrap();

        session.lookup_or_insert(Dimension::Client, "Acme").unwrap();
        assert!(session.dimension_names(Dimension::Technician).unwrap().is_empty());
        assert!(session.dimension_names(Dimension::TaskType).unwrap().is_empty());
        assert_eq!(session.dimension_names(Dimension::Client).unwrap(), vec!["Acme"]);
    }

    #[test]
    fn insert_then_fetch_returns_names() {
        let (_dir, store) = store();
        store
            .with_session(|s| {
                let t = s.lookup_or_insert(Dimension::Technician, "Ana")?;
                let c = s.lookup_or_insert(Dimension::Client, "Acme")?;
                let k = s.lookup_or_insert(Dimension::TaskType, "Support")?;
                assert!(s.insert_record(&record(t, c, k, 2.5))?);
                Ok(())
            })
            .unwrap();

        let rows = store.fetch_all_joined().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.technician, "Ana");
        assert_eq!(row.client, "Acme");
        assert_eq!(row.task_type, "Support");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(row.hours, 2.5);
        assert_eq!(row.completion_mode.as_deref(), Some("Remote"));
        assert_eq!(row.ticket_number.as_deref(), Some("T-100"));
        assert_eq!(row.description, None);
        assert_eq!(row.month, 3);
    }

    #[test]
    fn dangling_foreign_key_is_reported_not_raised() {
        let (_dir, store) = store();
        let session = store.open().unwrap();

        let inserted = session.insert_record(&record(99, 98, 97, 1.0)).unwrap();
        assert!(!inserted);
        assert_eq!(session.count_records().unwrap(), 0);
    }

    #[test]
    fn negative_hours_violate_check_constraint() {
        let (_dir, store) = store();
        let session = store.open().unwrap();
        let t = session.lookup_or_insert(Dimension::Technician, "Ana").unwrap();
        let c = session.lookup_or_insert(Dimension::Client, "Acme").unwrap();
        let k = session.lookup_or_insert(Dimension::TaskType, "Support").unwrap();

        assert!(!session.insert_record(&record(t, c, k, -1.0)).unwrap());
        assert!(session.insert_record(&record(t, c, k, 0.0)).unwrap());
        assert_eq!(session.count_records().unwrap(), 1);
    }

    #[test]
    fn open_fails_with_connection_error_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("missing").join("timesheet.db"));
        let err = store.open().err().unwrap();
        assert!(matches!(err, StorageError::Connection { .. }));
    }
}
