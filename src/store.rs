//! SQLite persistence for recorded samples

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::sampler::{Sample, TIMESTAMP_FORMAT};

/// Append-only log of samples. Owns one exclusive write connection; rows are
/// keyed by insertion order, never updated or deleted.
pub struct SampleStore {
    conn: Connection,
    path: PathBuf,
}

impl SampleStore {
    /// Open or create the backing file and make sure the schema exists.
    /// Schema creation is idempotent and never touches existing rows.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path).map_err(|source| Error::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute_batch(include_str!("../schema.sql"))
            .map_err(|source| Error::StorageUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one sample as a single auto-committed INSERT. Rows land in
    /// call order; no batching or reordering.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO monitoring (timestamp, cpu_load, ram_free, ram_total, disk_free, disk_total)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    sample.timestamp_text(),
                    sample.cpu_load_percent,
                    sample.ram_free_mb as i64,
                    sample.ram_total_mb as i64,
                    sample.disk_free_gb as i64,
                    sample.disk_total_gb as i64,
                ],
            )
            .map_err(Error::WriteFailed)?;
        Ok(())
    }

    /// Read back up to `limit` samples in insertion order, for verifying
    /// writes. The write path is the contract; this is not a query surface.
    pub fn get_samples(&self, limit: u32) -> Result<Vec<Sample>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT timestamp, cpu_load, ram_free, ram_total, disk_free, disk_total
                 FROM monitoring ORDER BY rowid ASC LIMIT ?1",
            )
            .map_err(Error::ReadFailed)?;
        let rows = stmt
            .query_map(params![limit], Self::map_sample)
            .map_err(Error::ReadFailed)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::ReadFailed)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM monitoring", [], |row| row.get(0))
            .map_err(Error::ReadFailed)?;
        Ok(count as u64)
    }

    fn map_sample(row: &rusqlite::Row) -> rusqlite::Result<Sample> {
        let text: String = row.get(0)?;
        let timestamp = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Sample {
            timestamp,
            cpu_load_percent: row.get(1)?,
            ram_free_mb: row.get::<_, i64>(2)? as u64,
            ram_total_mb: row.get::<_, i64>(3)? as u64,
            disk_free_gb: row.get::<_, i64>(4)? as u64,
            disk_total_gb: row.get::<_, i64>(5)? as u64,
        })
    }

    /// Release the connection, reporting any close failure. Dropping the
    /// store releases it too, so every exit path gives it up exactly once.
    pub fn close(self) -> Result<()> {
        let Self { conn, path } = self;
        conn.close()
            .map_err(|(_, source)| Error::StorageUnavailable { path, source })
    }
}
