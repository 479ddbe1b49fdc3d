// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer selection step of the print dialog.
//
// The user ticks one or more devices and confirms.  An empty selection is
// rejected with a notification; otherwise the selection is remembered for
// the report and the job is submitted.

use tracing::{instrument, warn};

use printwatch_core::error::{PrintwatchError, Result};
use printwatch_core::messages;
use printwatch_core::types::{DeviceRef, PrintId, PrintPayload, ReportId};

use crate::tracker::PrintJobTracker;

/// Confirms a device selection and starts the print job.
#[derive(Clone)]
pub struct PrinterSelection {
    tracker: PrintJobTracker,
}

impl PrinterSelection {
    pub fn new(tracker: PrintJobTracker) -> Self {
        Self { tracker }
    }

    /// Devices to pre-tick when the dialog opens for `report_id`.
    pub fn preselected(&self, report_id: ReportId) -> Vec<DeviceRef> {
        match self.tracker.last_selection(report_id) {
            Ok(refs) => refs.unwrap_or_default(),
            Err(e) => {
                warn!(%report_id, error = %e, "could not read remembered selection");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, selected, payload), fields(print_id = %print_id, selected = selected.len()))]
    pub async fn confirm(
        &self,
        print_id: PrintId,
        selected: &[DeviceRef],
        payload: &PrintPayload,
    ) -> Result<()> {
        if selected.is_empty() {
            self.tracker.notify(messages::no_printer_selected());
            return Err(PrintwatchError::NoPrinterSelected);
        }
        self.tracker
            .remember_selection(print_id, selected, payload)
            .await
    }
}
