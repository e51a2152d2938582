//! Store configuration.

use std::time::Duration;

/// Configuration shared by all store backends.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long SQLite waits on a locked database before failing the call.
    pub busy_timeout: Duration,
    /// Re-check density and the title-slide position inside every mutating
    /// transaction, before commit.
    pub verify_density: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(250),
            verify_density: true,
        }
    }
}
