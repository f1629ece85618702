//! Seed configuration.
//!
//! Read from YAML; every field is optional.
//!
//! ```yaml
//! table_name: CALDAR_RECORD
//! schema: legacy
//! batch_size: 250
//! create_table: true
//! seed_name: caldar_record
//! ```

use std::path::Path;

use fc_core::ensure;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where and how the calendar table is seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Target table.
    pub table_name: String,
    /// Optional schema (or attached database) qualifier.
    pub schema: Option<String>,
    /// Rows per `INSERT` statement in generated scripts.
    pub batch_size: usize,
    /// Emit or run `CREATE TABLE IF NOT EXISTS` before inserting.
    pub create_table: bool,
    /// Name recorded in the seed history.
    pub seed_name: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            table_name: "CALDAR_RECORD".into(),
            schema: None,
            batch_size: 500,
            create_table: true,
            seed_name: "caldar_record".into(),
        }
    }
}

impl SeedConfig {
    /// Load and validate a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded seed config");
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: SeedConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(
            is_identifier(&self.table_name),
            "table_name '{}' is not a plain identifier",
            self.table_name
        );
        if let Some(schema) = &self.schema {
            ensure!(
                is_identifier(schema),
                "schema '{schema}' is not a plain identifier"
            );
        }
        ensure!(
            !self.seed_name.is_empty(),
            "seed_name must not be empty"
        );
        Ok(())
    }

    /// `schema.table`, or just the table name.
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table_name),
            None => self.table_name.clone(),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
