//! Runtime configuration read from the environment.
//!
//! The binary loads `.env` with `dotenvy` before calling [`Config::from_env`].

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_TIMEOUT;
use crate::upstream::DEFAULT_BASE_URL;

pub const API_KEY_ENV: &str = "CTA_API_KEY";
pub const BASE_URL_ENV: &str = "CTA_BASE_URL";
pub const TRACKER_DB_ENV: &str = "API_TRACKER_DB_PATH";
pub const TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_SECS";

const DEFAULT_TRACKER_DB: &str = "data/api_tracker.db";

#[derive(Clone)]
pub struct Config {
    /// Upstream credential. May be empty here; the upstream client refuses
    /// to be built without one.
    pub api_key: String,
    pub base_url: String,
    pub tracker_db_path: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Config")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("tracker_db_path", &self.tracker_db_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty(TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))
                })?;
                if secs == 0 {
                    return Err(Error::Configuration(format!("{TIMEOUT_ENV} must be positive")));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key: lookup(API_KEY_ENV).unwrap_or_default().trim().to_string(),
            base_url: non_empty(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            tracker_db_path: non_empty(TRACKER_DB_ENV)
                .unwrap_or_else(|| DEFAULT_TRACKER_DB.to_string()),
            timeout,
        })
    }
}
