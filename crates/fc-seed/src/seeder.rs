//! The seeding interface and the SQL script seeder.

use std::io::Write;

use fc_time::AccountingPeriod;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::SeedConfig;
use crate::error::Result;
use crate::schema::{row_values, TableSchema};

/// What a seeding run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// Rows newly written.
    pub inserted: usize,
    /// Existing rows overwritten.
    pub updated: usize,
    /// Rows removed because a reapplied seed no longer contains them.
    pub deleted: usize,
    /// Rows left alone because the same seed was already applied.
    pub skipped: usize,
}

impl std::fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} deleted, {} skipped",
            self.inserted, self.updated, self.deleted, self.skipped
        )
    }
}

/// A facility that accepts seed data for a table.
///
/// Implementations decide what "registering" means: writing a migration
/// script, inserting into a live database, and so on.
pub trait EntitySeeder {
    /// Register `rows` as the contents of the table described by `schema`.
    fn has_data(&mut self, schema: &TableSchema, rows: &[AccountingPeriod]) -> Result<SeedOutcome>;
}

/// SHA-256 (hex) over the column values of `rows`, one comma-separated line
/// per row in the given order.
pub fn checksum(rows: &[AccountingPeriod]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        let line = row_values(row)
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Writes the seed as a SQL migration script.
pub struct SqlScriptSeeder<W: Write> {
    out: W,
    config: SeedConfig,
}

impl<W: Write> SqlScriptSeeder<W> {
    /// Seeder writing to `out`.
    pub fn new(out: W, config: SeedConfig) -> Self {
        Self { out, config }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EntitySeeder for SqlScriptSeeder<W> {
    fn has_data(&mut self, schema: &TableSchema, rows: &[AccountingPeriod]) -> Result<SeedOutcome> {
        self.config.validate()?;
        let table = self.config.qualified_table();

        writeln!(
            self.out,
            "-- seed {}: {} rows into {table}, checksum {}",
            self.config.seed_name,
            rows.len(),
            checksum(rows)
        )?;
        if self.config.create_table {
            write!(self.out, "{}", schema.create_table_sql(&table))?;
        }

        let columns = schema.column_list();
        for (n, batch) in rows.chunks(self.config.batch_size).enumerate() {
            tracing::trace!(batch = n, rows = batch.len(), "writing insert batch");
            writeln!(self.out, "INSERT INTO {table} ({columns}) VALUES")?;
            for (i, row) in batch.iter().enumerate() {
                let values = row_values(row)
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let end = if i + 1 == batch.len() { ";" } else { "," };
                writeln!(self.out, "    ({values}){end}")?;
            }
        }
        self.out.flush()?;

        tracing::info!(table = %table, rows = rows.len(), "wrote seed script");
        Ok(SeedOutcome {
            inserted: rows.len(),
            ..SeedOutcome::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CALDAR_RECORD;
    use crate::table::records;

    #[test]
    fn checksum_is_stable_and_order_sensitive() {
        let rows = &records()[..10];
        let a = checksum(rows);
        assert_eq!(a.len(), 64);
        assert_eq!(a, checksum(rows));

        let mut reversed = rows.to_vec();
        reversed.reverse();
        assert_ne!(a, checksum(&reversed));
    }

    #[test]
    fn checksum_sees_a_single_field_change() {
        let rows = &records()[..3];
        let mut changed = rows.to_vec();
        changed[1].cln7x.week += 1;
        assert_ne!(checksum(rows), checksum(&changed));
    }

    #[test]
    fn script_batches_rows() {
        let config = SeedConfig {
            batch_size: 2,
            create_table: false,
            ..SeedConfig::default()
        };
        let mut seeder = SqlScriptSeeder::new(Vec::new(), config);
        let outcome = seeder.has_data(&CALDAR_RECORD, &records()[..5]).unwrap();
        assert_eq!(outcome.inserted, 5);

        let script = String::from_utf8(seeder.into_inner()).unwrap();
        assert!(script.starts_with("-- seed caldar_record: 5 rows into CALDAR_RECORD"));
        assert!(!script.contains("CREATE TABLE"));
        assert_eq!(script.matches("INSERT INTO CALDAR_RECORD").count(), 3);
        assert!(script.contains("    (101, 20000101, 108, 52, 12, 1, 12, 52, 12, 52, 12, 52, 12, 52, 12, -356),"));
    }

    #[test]
    fn invalid_config_writes_nothing() {
        let config = SeedConfig {
            batch_size: 0,
            ..SeedConfig::default()
        };
        let mut seeder = SqlScriptSeeder::new(Vec::new(), config);
        assert!(seeder.has_data(&CALDAR_RECORD, records()).is_err());
        assert!(seeder.into_inner().is_empty());
    }
}
