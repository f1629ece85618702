//! `tracing` subscriber bootstrap.
//!
//! Library code only emits events through the `tracing` macros; binaries call
//! [`init`] once at startup. `RUST_LOG` wins over the verbosity flag.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map a `-v` count to a default level: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// Calling this twice is harmless: the second installation is ignored.
pub fn init(verbosity: u8) {
    let default = level_for_verbosity(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default.as_str().to_ascii_lowercase()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(9), Level::TRACE);
    }

    #[test]
    fn init_twice_is_harmless() {
        init(0);
        init(2);
    }
}
