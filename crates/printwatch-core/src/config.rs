// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Storage key under which the report → device selection mapping lives.
pub const DEFAULT_PREFERENCE_KEY: &str = "printwatch_report_preference";

/// Settings for the print job tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// How long to wait for device confirmations before declaring the
    /// remaining devices failed, in milliseconds (default 10 000).
    pub confirmation_timeout_ms: u64,
    /// Realtime channel carrying confirmation events.  No listener is
    /// started when unset.
    pub channel: Option<String>,
    /// Drop the pending job and its notifications as soon as submission
    /// fails, instead of letting the deadline expire it.
    pub teardown_on_submit_failure: bool,
    /// Key-value store key for remembered device selections.
    pub preference_key: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: 10_000,
            channel: None,
            teardown_on_submit_failure: false,
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(10));
        assert!(config.channel.is_none());
        assert!(!config.teardown_on_submit_failure);
        assert_eq!(config.preference_key, DEFAULT_PREFERENCE_KEY);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TrackerConfig::from_json(r#"{"channel":"iot_box_42"}"#).expect("parse");
        assert_eq!(config.channel.as_deref(), Some("iot_box_42"));
        assert_eq!(config.confirmation_timeout_ms, 10_000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(TrackerConfig::from_json("{channel").is_err());
    }
}
