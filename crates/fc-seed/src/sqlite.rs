//! Seeding a SQLite database.
//!
//! A seed runs in one transaction. Each applied seed is recorded in
//! `__seed_history` under its name and target table, with the checksum of
//! its rows. Rerunning an unchanged seed into the same table is a no-op. A
//! changed one is reapplied as upserts on the primary key, and rows the new
//! seed no longer contains are deleted.

use std::collections::HashSet;

use fc_time::AccountingPeriod;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Transaction};
use serde::Serialize;

use crate::config::SeedConfig;
use crate::error::{Result, SeedError};
use crate::schema::{row_from_values, row_values, TableSchema, CALDAR_RECORD, COLUMN_COUNT};
use crate::seeder::{checksum, EntitySeeder, SeedOutcome};

const HISTORY_SQL: &str = "
CREATE TABLE IF NOT EXISTS __seed_history (
    seed_name  TEXT NOT NULL,
    table_name TEXT NOT NULL,
    row_count  INTEGER NOT NULL,
    checksum   TEXT NOT NULL,
    applied_at TEXT NOT NULL,
    PRIMARY KEY (seed_name, table_name)
);
";

/// A row of `__seed_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedHistory {
    /// Seed name from the config.
    pub seed_name: String,
    /// Table the seed was applied to, schema-qualified when configured.
    pub table_name: String,
    /// Rows in the applied seed.
    pub row_count: i64,
    /// Checksum of the applied rows.
    pub checksum: String,
    /// RFC 3339 UTC timestamp.
    pub applied_at: String,
}

/// Seeds a live SQLite connection.
pub struct SqliteSeeder<'c> {
    conn: &'c mut Connection,
    config: SeedConfig,
}

impl<'c> SqliteSeeder<'c> {
    /// Seeder over `conn`.
    pub fn new(conn: &'c mut Connection, config: SeedConfig) -> Self {
        Self { conn, config }
    }

    /// Read the seeded table back, ordered by `ACC_WKEND_N`.
    pub fn read_back(&self) -> Result<Vec<AccountingPeriod>> {
        read_table(&*self.conn, &self.config.qualified_table())
    }

    /// The history entry of this seeder's seed and table, if it was ever
    /// applied.
    pub fn history(&self) -> Result<Option<SeedHistory>> {
        seed_history(
            &*self.conn,
            &self.config.seed_name,
            &self.config.qualified_table(),
        )
    }
}

impl EntitySeeder for SqliteSeeder<'_> {
    fn has_data(&mut self, schema: &TableSchema, rows: &[AccountingPeriod]) -> Result<SeedOutcome> {
        self.config.validate()?;
        let table = self.config.qualified_table();
        let sum = checksum(rows);

        let tx = self.conn.transaction()?;
        tx.execute_batch(HISTORY_SQL)?;
        if self.config.create_table {
            tx.execute_batch(&schema.create_table_sql(&table))?;
        }

        let recorded: Option<String> = tx
            .query_row(
                "SELECT checksum FROM __seed_history WHERE seed_name = ?1 AND table_name = ?2",
                params![self.config.seed_name, table],
                |r| r.get(0),
            )
            .optional()?;
        if recorded.as_deref() == Some(sum.as_str()) {
            tx.commit()?;
            tracing::info!(seed = %self.config.seed_name, table = %table, "seed already applied, skipping");
            return Ok(SeedOutcome {
                skipped: rows.len(),
                ..SeedOutcome::default()
            });
        }

        let count_sql = format!("SELECT COUNT(*) FROM {table}");
        let before: i64 = tx.query_row(&count_sql, [], |r| r.get(0))?;
        let sql = match recorded {
            Some(_) => {
                tracing::warn!(seed = %self.config.seed_name, table = %table, "seed checksum changed, reapplying");
                schema.upsert_sql(&table)
            }
            None => schema.insert_sql(&table),
        };
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row_values(row)))
                    .map_err(|e| constraint_to_duplicate(e, &table))?;
            }
        }
        let after: i64 = tx.query_row(&count_sql, [], |r| r.get(0))?;
        let deleted = match recorded {
            Some(_) => delete_absent(&tx, schema, &table, rows)?,
            None => 0,
        };

        tx.execute(
            "INSERT INTO __seed_history (seed_name, table_name, row_count, checksum, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(seed_name, table_name) DO UPDATE SET
                 row_count = excluded.row_count,
                 checksum = excluded.checksum,
                 applied_at = excluded.applied_at",
            params![
                self.config.seed_name,
                table,
                rows.len() as i64,
                sum,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        let inserted = usize::try_from(after - before).unwrap_or(0);
        let outcome = SeedOutcome {
            inserted,
            updated: rows.len().saturating_sub(inserted),
            deleted,
            skipped: 0,
        };
        tracing::info!(table = %table, %outcome, "seeded");
        Ok(outcome)
    }
}

/// Delete the rows of `table` whose primary key is not among `rows`.
fn delete_absent(
    tx: &Transaction<'_>,
    schema: &TableSchema,
    table: &str,
    rows: &[AccountingPeriod],
) -> Result<usize> {
    let keep: HashSet<i64> = rows
        .iter()
        .map(|r| i64::from(r.week_ending_ordinal.value()))
        .collect();
    let stored = {
        let mut stmt = tx.prepare(&format!("SELECT {} FROM {table}", schema.primary_key))?;
        let keys = stmt
            .query_map([], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        keys
    };

    let mut stmt = tx.prepare(&format!(
        "DELETE FROM {table} WHERE {} = ?1",
        schema.primary_key
    ))?;
    let mut deleted = 0;
    for key in stored.into_iter().filter(|k| !keep.contains(k)) {
        deleted += stmt.execute(params![key])?;
    }
    if deleted > 0 {
        tracing::warn!(table = %table, deleted, "removed rows absent from the reapplied seed");
    }
    Ok(deleted)
}

fn constraint_to_duplicate(err: rusqlite::Error, table: &str) -> SeedError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        SeedError::DuplicateKey {
            table: table.to_string(),
            detail: err.to_string(),
        }
    } else {
        SeedError::Sqlite(err)
    }
}

/// Read a `CALDAR_RECORD`-shaped table, ordered by `ACC_WKEND_N`.
pub fn read_table(conn: &Connection, table: &str) -> Result<Vec<AccountingPeriod>> {
    let sql = format!(
        "SELECT {} FROM {table} ORDER BY {}",
        CALDAR_RECORD.column_list(),
        CALDAR_RECORD.primary_key
    );
    let mut stmt = conn.prepare(&sql)?;
    let values = stmt
        .query_map([], |r| {
            let mut v = [0i64; COLUMN_COUNT];
            for (i, slot) in v.iter_mut().enumerate() {
                *slot = r.get(i)?;
            }
            Ok(v)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    values
        .iter()
        .map(|v| row_from_values(v).map_err(SeedError::from))
        .collect()
}

/// The `__seed_history` entry for `seed_name` applied to `table`.
pub fn seed_history(conn: &Connection, seed_name: &str, table: &str) -> Result<Option<SeedHistory>> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '__seed_history')",
        [],
        |r| r.get(0),
    )?;
    if !exists {
        return Ok(None);
    }
    let entry = conn
        .query_row(
            "SELECT seed_name, table_name, row_count, checksum, applied_at FROM __seed_history
             WHERE seed_name = ?1 AND table_name = ?2",
            params![seed_name, table],
            |r| {
                Ok(SeedHistory {
                    seed_name: r.get(0)?,
                    table_name: r.get(1)?,
                    row_count: r.get(2)?,
                    checksum: r.get(3)?,
                    applied_at: r.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(entry)
}
