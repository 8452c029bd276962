//! Shared `log` capture for tests asserting on connection diagnostics.

use std::sync::{Mutex, MutexGuard, OnceLock};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// Handle to the global logger with exclusive access.
///
/// Tests in one binary share a single [`logtest::Logger`]; the guard
/// serialises them so one test never drains another's records.
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] and discard records left by earlier
    /// tests.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut handle = Self { guard };
        handle.clear();
        handle
    }

    /// Drop every captured record.
    pub fn clear(&mut self) { while self.guard.pop().is_some() {} }

    /// Drain captured records at `level` and return their messages.
    pub fn drain_level(&mut self, level: Level) -> Vec<String> {
        let mut messages = Vec::new();
        while let Some(record) = self.guard.pop() {
            if record.level() == level {
                messages.push(record.args().to_owned());
            }
        }
        messages
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
