// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Remembered device selections per report.
//
// The whole mapping lives under one key-value store entry as a JSON object
// `{ "<report_id>": [<device_ref>, ...] }`.  Whatever else is found under
// that key (nothing, garbage, a JSON array) is treated as an empty mapping
// and overwritten on the next write.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use printwatch_bridge::KeyValueStore;
use printwatch_core::error::Result;
use printwatch_core::types::{DeviceRef, ReportId};

/// Report → last selected devices, persisted in a key-value store.
pub struct ReportPreferences {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ReportPreferences {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Record `refs` as the selection for `report_id`.
    pub fn remember(&self, report_id: ReportId, refs: &[DeviceRef]) -> Result<()> {
        let mut mapping = self.load()?;
        mapping.insert(report_id.to_string(), serde_json::to_value(refs)?);
        self.save(&mapping)?;
        debug!(%report_id, devices = refs.len(), "device selection remembered");
        Ok(())
    }

    /// Drop the selection for `report_id`.  No write happens when there is
    /// nothing to drop.
    pub fn forget(&self, report_id: ReportId) -> Result<()> {
        let mut mapping = self.load()?;
        if mapping.remove(&report_id.to_string()).is_some() {
            self.save(&mapping)?;
            debug!(%report_id, "device selection forgotten");
        }
        Ok(())
    }

    /// Last selection for `report_id`, if one was stored and still parses.
    pub fn lookup(&self, report_id: ReportId) -> Result<Option<Vec<DeviceRef>>> {
        let mut mapping = self.load()?;
        let Some(entry) = mapping.remove(&report_id.to_string()) else {
            return Ok(None);
        };
        match serde_json::from_value(entry) {
            Ok(refs) => Ok(Some(refs)),
            Err(e) => {
                warn!(%report_id, error = %e, "ignoring unreadable device selection");
                Ok(None)
            }
        }
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Map::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(mapping)) => Ok(mapping),
            Ok(other) => {
                warn!(key = %self.key, found = %type_name(&other), "preference entry is not an object, resetting");
                Ok(Map::new())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "preference entry is not valid JSON, resetting");
                Ok(Map::new())
            }
        }
    }

    fn save(&self, mapping: &Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string(mapping)?;
        self.store.set(&self.key, &raw)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
