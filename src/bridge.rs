//! Routes records from the `log` facade into a [`Logger`].
//!
//! The `log` crate filters by its own max level first; records that get
//! through are then checked against the logger's [`LevelSet`](crate::LevelSet).
//! `Trace` and `Debug` both map to [`Level::Debug`].

use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::level::Level;
use crate::logger::Logger;

/// A `log::Log` implementation writing through an [`Logger`].
#[derive(Debug, Clone)]
pub struct LogBridge {
    logger: Arc<Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.logger.is_enabled(metadata.level().into())
    }

    fn log(&self, record: &Record<'_>) {
        let level = Level::from(record.level());
        self.logger
            .print_fmt_level(level, format_args!("{}: {}", record.target(), record.args()));
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

/// Installs a [`LogBridge`] over `logger` as the global `log` logger.
///
/// Fails if another `log` logger is already installed.
pub fn init(logger: Arc<Logger>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(LogBridge::new(logger)))?;
    log::set_max_level(max_level);
    tracing::debug!(%max_level, "alog: log bridge installed");
    Ok(())
}
