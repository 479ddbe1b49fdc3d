// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbound confirmation events from the realtime channel.
//
// Print devices report back over a push bus with frames shaped like
// `[{"type": "<kind>", "payload": {...}}, ...]` (a single object is also
// accepted).  Only `print_confirmation` events matter here; everything else
// on the channel belongs to other consumers and is skipped.

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use printwatch_bridge::RealtimeChannel;
use printwatch_core::error::Result;
use printwatch_core::types::PrintId;

use crate::tracker::PrintJobTracker;

/// Event type carrying a device confirmation.
pub const PRINT_CONFIRMATION: &str = "print_confirmation";

/// One event from the realtime channel, payload left undecoded.
#[derive(Debug, Clone, Deserialize)]
pub struct BusEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload of a `print_confirmation` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrintConfirmation {
    pub device_identifier: String,
    pub print_id: PrintId,
}

impl BusEvent {
    /// Decode the payload if this is a print confirmation.
    ///
    /// Returns `None` for other event types and for confirmations whose
    /// payload does not have the expected shape.
    pub fn as_confirmation(&self) -> Option<PrintConfirmation> {
        if self.kind != PRINT_CONFIRMATION {
            return None;
        }
        match serde_json::from_value(self.payload.clone()) {
            Ok(confirmation) => Some(confirmation),
            Err(e) => {
                warn!(error = %e, "malformed print confirmation payload");
                None
            }
        }
    }
}

/// Parse one raw frame into its events.
///
/// Only text that is not JSON at all is an error.  Events are decoded one
/// by one; an element that is not a `{"type", "payload"}` object is logged
/// and skipped so the rest of the batch still gets through.
pub fn parse_frame(text: &str) -> Result<Vec<BusEvent>> {
    let elements = match serde_json::from_str(text)? {
        serde_json::Value::Array(elements) => elements,
        single => vec![single],
    };

    let events = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<BusEvent>(element) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "skipping unreadable bus event");
                None
            }
        })
        .collect();
    Ok(events)
}

/// Parse a frame and forward each confirmation for a pending job to the
/// tracker.  Returns the number of confirmations dispatched.
pub fn dispatch_frame(tracker: &PrintJobTracker, text: &str) -> Result<usize> {
    let mut dispatched = 0;
    for event in parse_frame(text)? {
        let Some(confirmation) = event.as_confirmation() else {
            continue;
        };
        if !tracker.is_pending(&confirmation.print_id) {
            debug!(print_id = %confirmation.print_id, "confirmation for job not tracked here");
            continue;
        }
        tracker.on_confirmation(&confirmation.print_id, &confirmation.device_identifier);
        dispatched += 1;
    }
    Ok(dispatched)
}

/// Feed every frame from `frames` into the tracker until the sender side
/// closes.  Malformed frames are logged and skipped.
pub async fn listen(tracker: PrintJobTracker, mut frames: mpsc::Receiver<String>) {
    while let Some(frame) = frames.recv().await {
        match dispatch_frame(&tracker, &frame) {
            Ok(0) => {}
            Ok(n) => debug!(confirmations = n, "frame dispatched"),
            Err(e) => warn!(error = %e, "skipping unreadable frame"),
        }
    }
    info!("confirmation channel closed");
}

/// Subscribes the tracker to its configured realtime channel.
pub struct ConfirmationListener;

impl ConfirmationListener {
    /// Start listening on `TrackerConfig::channel`.
    ///
    /// Returns `Ok(None)` when no channel is configured, in which case
    /// confirmations must be delivered by calling
    /// [`PrintJobTracker::on_confirmation`] directly.
    pub fn start(
        tracker: PrintJobTracker,
        bus: &dyn RealtimeChannel,
    ) -> Result<Option<JoinHandle<()>>> {
        let Some(channel) = tracker.config().channel.clone() else {
            debug!("no realtime channel configured, confirmation listener not started");
            return Ok(None);
        };
        let frames = bus.subscribe(&channel)?;
        info!(channel = %channel, "confirmation listener started");
        Ok(Some(tokio::spawn(listen(tracker, frames))))
    }
}
