//! Error types for fiscal-calendar.
//!
//! A single `thiserror`-derived enum covers the failures of the data layer:
//! malformed literals in the calendar table, violated preconditions on
//! lookups, and unknown keys. The `ensure!` macro keeps precondition checks
//! short.

use thiserror::Error;

/// The top-level error type used throughout fiscal-calendar.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Date-related error (bad literal, out-of-range arithmetic).
    #[error("date error: {0}")]
    Date(String),

    /// A row of calendar data could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending data row.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A lookup key is not present in the calendar.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand `Result` type used throughout fiscal-calendar.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fc_core::{ensure, errors::Error};
/// fn positive(x: i32) -> fc_core::errors::Result<i32> {
///     ensure!(x > 0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1).is_ok());
/// assert!(positive(-1).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ).into());
        }
    };
}
