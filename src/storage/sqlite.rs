use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::repository::{CanvasRepository, CanvasRow, ResultLogEntry};
use crate::entity::{
    GainCreator, HistoryMetadata, PainReliever, ProductService, UspCanvas, ENTRY_TYPE_DRAFT,
    ENTRY_TYPE_FINAL,
};
use crate::error::{CanvasError, Result};

/// The value map arrays share one column
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Differentiators {
    product_services: Vec<ProductService>,
    pain_relievers: Vec<PainReliever>,
    gain_creators: Vec<GainCreator>,
}

/// SQLite-backed remote canvas store
pub struct SqliteCanvasRepository {
    conn: Mutex<Connection>,
}

impl SqliteCanvasRepository {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Initialize the database schema
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS usp_canvas (
            strategy_id TEXT PRIMARY KEY,
            customer_jobs TEXT NOT NULL,
            pain_points TEXT NOT NULL,
            gains TEXT NOT NULL,
            differentiators TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS strategy_results (
            id TEXT PRIMARY KEY,
            strategy_id TEXT NOT NULL,
            content TEXT NOT NULL,
            metadata TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_strategy ON strategy_results(strategy_id)",
        [],
    )?;

    Ok(())
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CanvasError::Storage(format!("invalid timestamp '{}': {}", raw, e)))
}

fn stored_version(conn: &Connection, strategy_id: &str) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT version FROM usp_canvas WHERE strategy_id = ?1",
            [strategy_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version.unwrap_or(0))
}

/// Write the canvas row inside the caller's transaction.
fn write_canvas(
    tx: &Transaction<'_>,
    strategy_id: &str,
    canvas: &UspCanvas,
    expected_version: Option<i64>,
) -> Result<i64> {
    let differentiators = Differentiators {
        product_services: canvas.product_services.clone(),
        pain_relievers: canvas.pain_relievers.clone(),
        gain_creators: canvas.gain_creators.clone(),
    };

    let current = stored_version(tx, strategy_id)?;
    if let Some(expected) = expected_version {
        if expected != current {
            return Err(CanvasError::VersionConflict {
                expected,
                actual: current,
            });
        }
    }
    let next = current + 1;

    tx.execute(
        "INSERT INTO usp_canvas
         (strategy_id, customer_jobs, pain_points, gains, differentiators, updated_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(strategy_id) DO UPDATE SET
            customer_jobs = excluded.customer_jobs,
            pain_points = excluded.pain_points,
            gains = excluded.gains,
            differentiators = excluded.differentiators,
            updated_at = excluded.updated_at,
            version = excluded.version",
        params![
            strategy_id,
            serde_json::to_string(&canvas.customer_jobs)?,
            serde_json::to_string(&canvas.customer_pains)?,
            serde_json::to_string(&canvas.customer_gains)?,
            serde_json::to_string(&differentiators)?,
            format_time(&Utc::now()),
            next,
        ],
    )?;

    Ok(next)
}

fn insert_result(conn: &Connection, entry: &ResultLogEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO strategy_results (id, strategy_id, content, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.strategy_id,
            entry.content,
            serde_json::to_string(&entry.metadata)?,
            format_time(&entry.created_at),
        ],
    )?;
    Ok(())
}

fn fetch(conn: &Connection, strategy_id: &str) -> Result<Option<CanvasRow>> {
    let raw: Option<(String, String, String, String, String, i64)> = conn
        .query_row(
            "SELECT customer_jobs, pain_points, gains, differentiators, updated_at, version
             FROM usp_canvas WHERE strategy_id = ?1",
            [strategy_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;

    let Some((jobs, pains, gains, differentiators, updated_at, version)) = raw else {
        return Ok(None);
    };

    let differentiators: Differentiators = serde_json::from_str(&differentiators)?;
    let canvas = UspCanvas {
        customer_jobs: serde_json::from_str(&jobs)?,
        customer_pains: serde_json::from_str(&pains)?,
        customer_gains: serde_json::from_str(&gains)?,
        product_services: differentiators.product_services,
        pain_relievers: differentiators.pain_relievers,
        gain_creators: differentiators.gain_creators,
    };

    Ok(Some(CanvasRow {
        strategy_id: strategy_id.to_string(),
        canvas,
        updated_at: parse_time(&updated_at)?,
        version,
    }))
}

fn list(conn: &Connection, strategy_id: &str) -> Result<Vec<ResultLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, metadata, created_at
         FROM strategy_results
         WHERE strategy_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map([strategy_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(rows.len());
    for (id, content, metadata, created_at) in rows {
        match parse_result(strategy_id, &id, content, &metadata, &created_at) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {
                tracing::debug!(%id, "skipping result that is not a canvas snapshot");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "skipping unreadable result row");
            }
        }
    }

    Ok(entries)
}

/// The log is shared with other result types; only canvas snapshots are kept.
fn parse_result(
    strategy_id: &str,
    id: &str,
    content: String,
    metadata: &str,
    created_at: &str,
) -> Result<Option<ResultLogEntry>> {
    let metadata: HistoryMetadata = serde_json::from_str(metadata)?;
    if metadata.entry_type != ENTRY_TYPE_DRAFT && metadata.entry_type != ENTRY_TYPE_FINAL {
        return Ok(None);
    }

    let id = id
        .parse::<uuid::Uuid>()
        .map_err(|e| CanvasError::Storage(format!("invalid result id '{}': {}", id, e)))?;

    Ok(Some(ResultLogEntry {
        id,
        strategy_id: strategy_id.to_string(),
        content,
        metadata,
        created_at: parse_time(created_at)?,
    }))
}

#[async_trait]
impl CanvasRepository for SqliteCanvasRepository {
    async fn fetch_canvas(&self, strategy_id: &str) -> Result<Option<CanvasRow>> {
        let conn = self.conn.lock().await;
        fetch(&conn, strategy_id)
    }

    async fn upsert_canvas(
        &self,
        strategy_id: &str,
        canvas: &UspCanvas,
        expected_version: Option<i64>,
    ) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let version = write_canvas(&tx, strategy_id, canvas, expected_version)?;
        tx.commit()?;
        Ok(version)
    }

    async fn delete_canvas(&self, strategy_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM usp_canvas WHERE strategy_id = ?1", [strategy_id])?;
        Ok(())
    }

    async fn append_result(&self, entry: &ResultLogEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        insert_result(&conn, entry)
    }

    async fn list_results(&self, strategy_id: &str) -> Result<Vec<ResultLogEntry>> {
        let conn = self.conn.lock().await;
        list(&conn, strategy_id)
    }

    async fn save_snapshot(
        &self,
        strategy_id: &str,
        canvas: &UspCanvas,
        expected_version: Option<i64>,
        entry: &ResultLogEntry,
    ) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let version = write_canvas(&tx, strategy_id, canvas, expected_version)?;
        insert_result(&tx, entry)?;
        tx.commit()?;
        Ok(version)
    }
}
