use std::{fs::File, path::Path, sync::Arc};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;

use crate::error::RoutingError;

/// Installs the global subscriber: pretty output on stdout filtered to
/// `level`, plus an unfiltered log file when `debug_log` is given.
pub struct LibTracer {
    level: LevelFilter,
    debug_log: Option<Arc<File>>,
}

impl LibTracer {
    pub fn new(level: LevelFilter) -> Self {
        LibTracer { level, debug_log: None }
    }

    pub fn with_debug_log(mut self, path: &Path) -> Result<Self, RoutingError> {
        let file = File::create(path)
            .map_err(|e| RoutingError::TracingInit(format!("cannot create {}: {e}", path.display())))?;
        self.debug_log = Some(Arc::new(file));
        Ok(self)
    }

    pub fn install(self) -> Result<(), RoutingError> {
        let stdout_log = tracing_subscriber::fmt::layer().pretty();
        let debug_log = self
            .debug_log
            .map(|file| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file));

        tracing_subscriber::registry()
            .with(
                stdout_log
                    // Add the level filter to the stdout logging layer only.
                    .with_filter(self.level)
                    // Combine the filtered `stdout_log` layer with the optional
                    // `debug_log` layer.
                    .and_then(debug_log),
            )
            .try_init()
            .map_err(|e| RoutingError::TracingInit(e.to_string()))
    }
}

impl Default for LibTracer {
    fn default() -> Self {
        LibTracer::new(LevelFilter::INFO)
    }
}
