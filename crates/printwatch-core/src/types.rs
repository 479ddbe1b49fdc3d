// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Printwatch print job tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation token for a print job.
///
/// Chosen by the caller and echoed back by the print device in its
/// confirmation event, so it is an opaque string rather than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrintId(pub String);

impl PrintId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random token for callers without their own correlation id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrintId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stored reference to a print device record (what the user selected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRef(pub i64);

impl std::fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the report being printed.  Doubles as the preference key
/// under which the last device selection is remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub i64);

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A print device as returned by the device resolver.
///
/// Fields other than `identifier` and `display_name` are resolver-specific
/// and are passed back to the submitter untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Identifier echoed back in confirmation events.
    pub identifier: String,
    /// Human-readable label used in notifications.
    pub display_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceDescriptor {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// What to print: the report plus the records it is rendered for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintPayload {
    pub report_id: ReportId,
    pub active_record_ids: Vec<i64>,
    /// Extra rendering data (wizard values, options).
    #[serde(default)]
    pub report_data: Option<serde_json::Value>,
}

impl PrintPayload {
    pub fn new(report_id: ReportId, active_record_ids: Vec<i64>) -> Self {
        Self {
            report_id,
            active_record_ids,
            report_data: None,
        }
    }
}

/// Visual style of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// A transient or sticky message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub title: Option<String>,
    pub kind: NotificationKind,
    /// Sticky notifications stay until explicitly dismissed.
    pub sticky: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: None,
            kind,
            sticky: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

/// Handle to a displayed notification, used to dismiss it later.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NotificationHandle(pub u64);

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-device bookkeeping inside a pending job.
///
/// Owns the handle of the "sending" notification.  The handle is not
/// `Clone`, so releasing it consumes the ticket and it can only be dismissed
/// once.
#[derive(Debug)]
pub struct DeviceTicket {
    pub device_id: String,
    pub display_name: String,
    pub notification: NotificationHandle,
}

/// Read-only view of a pending job, for status displays and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingJobSnapshot {
    pub print_id: PrintId,
    /// `(device_id, display_name)` pairs still awaiting confirmation, in
    /// submission order.
    pub devices: Vec<(String, String)>,
    pub submitted_at: DateTime<Utc>,
}

impl PendingJobSnapshot {
    pub fn device_ids(&self) -> Vec<&str> {
        self.devices.iter().map(|(id, _)| id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_keeps_extra_fields() {
        let json = r#"{"identifier":"printer_1","display_name":"Epson","iot_ip":"10.0.0.4","id":7}"#;
        let device: DeviceDescriptor = serde_json::from_str(json).expect("parse");
        assert_eq!(device.identifier, "printer_1");
        assert_eq!(device.display_name, "Epson");
        assert_eq!(device.extra["iot_ip"], "10.0.0.4");

        let back = serde_json::to_value(&device).expect("serialize");
        assert_eq!(back["id"], 7);
    }

    #[test]
    fn print_id_is_transparent() {
        let id = PrintId::new("abc");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"abc\"");
    }

    #[test]
    fn generated_print_ids_differ() {
        assert_ne!(PrintId::generate(), PrintId::generate());
    }

    #[test]
    fn payload_without_report_data() {
        let payload: PrintPayload =
            serde_json::from_str(r#"{"report_id":3,"active_record_ids":[1,2]}"#).expect("parse");
        assert_eq!(payload.report_id, ReportId(3));
        assert!(payload.report_data.is_none());
    }
}
