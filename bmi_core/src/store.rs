//! SQLite-backed record store.
//!
//! Records are append-only. Each row carries the weight/height it was
//! computed from together with the derived bmi and category, and rows are
//! re-validated against the engine when read back.

use crate::{engine, BmiRecord, Category, Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current schema version stored in `PRAGMA user_version`
const SCHEMA_VERSION: i64 = 1;

/// Relative tolerance when checking a stored bmi against its inputs
const BMI_TOLERANCE: f64 = 1e-9;

/// Record store trait for persisting and querying BMI records
pub trait RecordStore {
    /// Compute and persist a new record, returning it as stored
    fn add_record(
        &mut self,
        user_id: &str,
        weight_kg: f64,
        height_m: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<BmiRecord>;

    /// All records for a user, oldest first
    fn list_records(&self, user_id: &str) -> Result<Vec<BmiRecord>>;

    /// Distinct user ids, sorted case-insensitively
    fn list_users(&self) -> Result<Vec<String>>;
}

/// Storage handle owning the database connection
///
/// The connection is released when the store is dropped; use
/// [`SqliteStore::close`] to observe close failures.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring its schema up to date
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    Error::StorageUnavailable {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let conn = Connection::open(&path)?;
        let store = Self { conn, path };
        store.migrate()?;

        tracing::debug!("Opened record store at {:?}", store.path);
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the connection, surfacing any error from SQLite
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| Error::Storage(e))?;
        tracing::debug!("Closed record store at {:?}", path);
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    timestamp TEXT NOT NULL,
                    weight_kg REAL NOT NULL,
                    height_m REAL NOT NULL,
                    bmi REAL NOT NULL,
                    category TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_records_user_timestamp
                    ON records(user_id, timestamp);

                PRAGMA user_version = 1;",
            )?;
            tracing::info!("Initialized record store schema v{}", SCHEMA_VERSION);
        }

        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn add_record(
        &mut self,
        user_id: &str,
        weight_kg: f64,
        height_m: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<BmiRecord> {
        let user_id = normalize_user_id(user_id)?;
        let reading = engine::compute(weight_kg, height_m)?;

        let record = BmiRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            timestamp,
            weight_kg,
            height_m,
            bmi: reading.bmi,
            category: reading.category,
        };

        self.conn.execute(
            "INSERT INTO records (id, user_id, timestamp, weight_kg, height_m, bmi, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.user_id,
                encode_timestamp(&record.timestamp),
                record.weight_kg,
                record.height_m,
                record.bmi,
                record.category.as_str(),
            ],
        )?;

        tracing::debug!(
            "Stored record {} for '{}' (bmi {:.2}, {})",
            record.id,
            record.user_id,
            record.bmi,
            record.category
        );
        Ok(record)
    }

    fn list_records(&self, user_id: &str) -> Result<Vec<BmiRecord>> {
        let user_id = user_id.trim();
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, timestamp, weight_kg, height_m, bmi, category
             FROM records
             WHERE user_id = ?1
             ORDER BY timestamp, rowid",
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    timestamp: row.get(2)?,
                    weight_kg: row.get(3)?,
                    height_m: row.get(4)?,
                    bmi: row.get(5)?,
                    category: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .map(BmiRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} records for '{}'", records.len(), user_id);
        Ok(records)
    }

    fn list_users(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT user_id FROM records ORDER BY user_id COLLATE NOCASE, user_id",
        )?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(users)
    }
}

/// Untyped row as read from the `records` table
struct RawRow {
    id: String,
    user_id: String,
    timestamp: String,
    weight_kg: f64,
    height_m: f64,
    bmi: f64,
    category: String,
}

impl TryFrom<RawRow> for BmiRecord {
    type Error = Error;

    fn try_from(row: RawRow) -> Result<Self> {
        let corrupt = |reason: String| Error::CorruptRecord {
            id: row.id.clone(),
            reason,
        };

        let id = Uuid::parse_str(&row.id).map_err(|e| corrupt(format!("invalid id: {}", e)))?;

        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| corrupt(format!("invalid timestamp '{}': {}", row.timestamp, e)))?
            .with_timezone(&Utc);

        let category: Category = row
            .category
            .parse()
            .map_err(|_| corrupt(format!("unknown category '{}'", row.category)))?;

        let expected = engine::compute(row.weight_kg, row.height_m)
            .map_err(|e| corrupt(e.to_string()))?;

        if (expected.bmi - row.bmi).abs() > BMI_TOLERANCE * expected.bmi.abs().max(1.0) {
            return Err(corrupt(format!(
                "stored bmi {} does not match weight/height (expected {})",
                row.bmi, expected.bmi
            )));
        }
        if expected.category != category {
            return Err(corrupt(format!(
                "stored category {} does not match bmi (expected {})",
                category, expected.category
            )));
        }

        Ok(BmiRecord {
            id,
            user_id: row.user_id,
            timestamp,
            weight_kg: row.weight_kg,
            height_m: row.height_m,
            bmi: row.bmi,
            category,
        })
    }
}

/// Fixed-width UTC encoding so text order matches time order
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn normalize_user_id(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("user id must not be empty".into()));
    }
    Ok(trimmed)
}
