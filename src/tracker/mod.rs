//! Upstream call accounting.
//!
//! [`CallRecorder`] is the only surface the fetch pipeline sees. Recording is
//! best-effort: callers log a failed `record` and carry on.

mod sqlite;

pub use sqlite::SqliteCallTracker;

use async_trait::async_trait;

use crate::error::Result;

/// Sink notified once per successful upstream call.
#[async_trait]
pub trait CallRecorder: Send + Sync {
    async fn record(&self, identifier: &str) -> Result<()>;
}
