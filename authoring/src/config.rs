//! Configuration for the authoring client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Image limits are fixed constants in [`crate::images`], not configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoringConfig {
    /// REST backend
    pub api: ApiConfig,
    /// Slot editor
    pub editor: EditorConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Bearer token sent on API calls (never on pre-signed uploads)
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Slot editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Offset from UTC, in minutes, that slot times are entered in
    pub utc_offset_minutes: i32,
}

impl Default for AuthoringConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AuthoringConfig {
    /// Load configuration from environment variables
    ///
    /// - `ECOEVENTS_API_URL` (default `http://localhost:3000`)
    /// - `ECOEVENTS_API_TOKEN` (optional)
    /// - `ECOEVENTS_HTTP_TIMEOUT_SECS` (default 30)
    /// - `ECOEVENTS_UTC_OFFSET_MINUTES` (default 0)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; unparseable values fall back to defaults
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api: ApiConfig {
                base_url: lookup("ECOEVENTS_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
                auth_token: lookup("ECOEVENTS_API_TOKEN").filter(|token| !token.is_empty()),
                timeout_secs: lookup("ECOEVENTS_HTTP_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            editor: EditorConfig {
                utc_offset_minutes: lookup("ECOEVENTS_UTC_OFFSET_MINUTES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            },
        }
    }
}

impl ApiConfig {
    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EditorConfig {
    /// Offset slot times are entered in; out-of-range values mean UTC
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(minutes = self.utc_offset_minutes, "UTC offset out of range, using UTC");
                Utc.fix()
            })
    }
}
