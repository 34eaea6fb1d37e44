//! Classification of upstream error envelopes.
//!
//! The provider reuses its `error` array both for hard failures and for
//! per-route "nothing running right now" notices, so the decision has to be
//! made on message content.

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::upstream::UpstreamError;

const BENIGN_PHRASES: [&str; 2] = ["no data found", "no service scheduled"];

/// Returns `true` iff the list is non-empty and every message,
/// case-insensitively, contains one of the no-data phrases.
pub fn is_benign_no_data(errors: &[UpstreamError]) -> bool {
    !errors.is_empty()
        && errors.iter().all(|e| {
            let msg = e.msg.to_lowercase();
            BENIGN_PHRASES.iter().any(|phrase| msg.contains(phrase))
        })
}

/// Applies the envelope policy shared by the route and vehicle calls.
///
/// A payload with entries is accepted even if errors accompany it. An empty
/// payload with benign errors is an empty result; any other error set is
/// surfaced as [`Error::UpstreamReported`].
pub fn settle<T>(items: Vec<T>, errors: Vec<UpstreamError>) -> Result<Vec<T>> {
    if !items.is_empty() || errors.is_empty() {
        return Ok(items);
    }
    if is_benign_no_data(&errors) {
        info!(notices = errors.len(), "upstream reported no active data");
        return Ok(Vec::new());
    }
    error!(errors = ?errors, "upstream returned error");
    Err(Error::UpstreamReported { errors })
}
