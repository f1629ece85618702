//! Global settings.
//!
//! [`Settings`] holds the **evaluation date**: the date treated as "today" by
//! lookups such as the current fiscal year. It is a process-wide singleton
//! accessed via a `std::sync::OnceLock`. When no evaluation date is set the
//! callers fall back to the system clock.
//!
//! Thread safety: the evaluation date is stored behind a `Mutex` so that it
//! can be changed from any thread. Tests that pin the date should use
//! [`ScopedEvaluationDate`] so the previous value is restored.

use std::sync::{Mutex, OnceLock};

/// Process-wide settings.
pub struct Settings {
    /// The current evaluation date as a day serial (1 = 1900-01-01).
    evaluation_date: Mutex<Option<i32>>,
}

static INSTANCE: OnceLock<Settings> = OnceLock::new();

impl Settings {
    /// Return a reference to the global singleton.
    pub fn instance() -> &'static Settings {
        INSTANCE.get_or_init(|| Settings {
            evaluation_date: Mutex::new(None),
        })
    }

    /// Return the evaluation date serial, or `None` to use the system clock.
    pub fn evaluation_date_serial(&self) -> Option<i32> {
        *self
            .evaluation_date
            .lock()
            .expect("Settings mutex poisoned")
    }

    /// Pin the evaluation date to the given serial.
    pub fn set_evaluation_date_serial(&self, serial: i32) {
        *self
            .evaluation_date
            .lock()
            .expect("Settings mutex poisoned") = Some(serial);
    }

    /// Clear the evaluation date, resetting it to "use today".
    pub fn reset_evaluation_date(&self) {
        *self
            .evaluation_date
            .lock()
            .expect("Settings mutex poisoned") = None;
    }

    fn replace_evaluation_date(&self, serial: Option<i32>) -> Option<i32> {
        std::mem::replace(
            &mut *self
                .evaluation_date
                .lock()
                .expect("Settings mutex poisoned"),
            serial,
        )
    }
}

/// Pins the evaluation date for the lifetime of the guard.
///
/// The previous value is restored on drop.
#[must_use = "the evaluation date is restored as soon as the guard is dropped"]
pub struct ScopedEvaluationDate {
    previous: Option<i32>,
}

impl ScopedEvaluationDate {
    /// Set the evaluation date to `serial` until the guard is dropped.
    pub fn new(serial: i32) -> Self {
        let previous = Settings::instance().replace_evaluation_date(Some(serial));
        Self { previous }
    }
}

impl Drop for ScopedEvaluationDate {
    fn drop(&mut self) {
        Settings::instance().replace_evaluation_date(self.previous);
    }
}
