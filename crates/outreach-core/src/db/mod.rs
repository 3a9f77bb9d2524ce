//! Database operations and SQLite management for the outreach store.
//!
//! This module provides the low-level storage layer: connection setup, schema
//! management, and query interfaces split by entity (leads, sequences, steps,
//! generated content). Every state transition that must not race is a single
//! conditional `UPDATE` whose affected-row count decides success.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use jiff::Timestamp;
use rusqlite::{types::Type, Connection, Row};

use crate::error::{DatabaseResultExt, Result};

pub mod content_queries;
pub mod lead_queries;
pub mod migrations;
pub mod sequence_queries;
pub mod step_queries;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Opens a fresh connection on the blocking pool and runs `f` against it.
pub(crate) async fn run_blocking<T, F>(db_path: PathBuf, f: F) -> Result<T>
where
    F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut db = Database::new(&db_path)?;
        f(&mut db)
    })
    .await?
}

/// Reads an RFC 3339 text column as a timestamp.
pub(crate) fn timestamp_at(row: &Row, index: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(index)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

/// Reads a nullable RFC 3339 text column.
pub(crate) fn optional_timestamp_at(row: &Row, index: usize) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(index)?
        .map(|raw| {
            raw.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Reads an integer millisecond column as a timestamp.
pub(crate) fn millis_at(row: &Row, index: usize) -> rusqlite::Result<Timestamp> {
    let millis: i64 = row.get(index)?;
    Timestamp::from_millisecond(millis)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e)))
}

/// Reads a text column through the type's `FromStr` implementation.
pub(crate) fn parsed_at<T>(row: &Row, index: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(index)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, e.into()))
}

/// Reads a nullable JSON text column.
pub(crate) fn json_at<T>(row: &Row, index: usize) -> rusqlite::Result<Option<T>>
where
    T: serde::de::DeserializeOwned,
{
    row.get::<_, Option<String>>(index)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
            })
        })
        .transpose()
}
