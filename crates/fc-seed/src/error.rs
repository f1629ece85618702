//! Errors raised while loading, checking, or seeding the calendar table.

use thiserror::Error;

/// Seeding error.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Data or precondition error from the calendar types.
    #[error(transparent)]
    Core(#[from] fc_core::Error),

    /// The database rejected a statement.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A row collides with an existing business key.
    #[error("duplicate key in {table}: {detail}")]
    DuplicateKey {
        /// Qualified table name.
        table: String,
        /// Message from the database.
        detail: String,
    },

    /// Reading or writing a file or stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The seed configuration file is not valid YAML for [`crate::SeedConfig`].
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Shorthand `Result` for seeding operations.
pub type Result<T, E = SeedError> = std::result::Result<T, E>;
