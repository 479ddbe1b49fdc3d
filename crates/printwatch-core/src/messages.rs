// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User-facing notification texts for the print job lifecycle.
//
// Kept in one place so that the wording stays consistent between the
// tracker, the selection flow, and any UI that wants to match on them.

use crate::types::{Notification, NotificationKind};

/// Sticky "in progress" notice shown per device while a job is in flight.
pub fn sending(display_name: &str) -> Notification {
    Notification::new(
        NotificationKind::Info,
        format!("Sending to printer {display_name}..."),
    )
    .sticky()
}

/// Shown when a device confirms the job.
pub fn completed(display_name: &str) -> Notification {
    Notification::new(
        NotificationKind::Success,
        format!("Printing operation completed on printer {display_name}"),
    )
}

/// Shown for each device still unconfirmed when the deadline passes.
pub fn connection_failed(display_name: &str) -> Notification {
    Notification::new(
        NotificationKind::Danger,
        "Check the IoT connection. Try restarting if needed.",
    )
    .with_title(format!("Connection to printer failed {display_name}"))
}

/// Shown when the user confirms a print dialog without picking a device.
pub fn no_printer_selected() -> Notification {
    Notification::new(NotificationKind::Danger, "Select at least one printer")
        .with_title("No printer selected")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sending_is_sticky_info() {
        let n = sending("Epson");
        assert_eq!(n.message, "Sending to printer Epson...");
        assert_eq!(n.kind, NotificationKind::Info);
        assert!(n.sticky);
    }

    #[test]
    fn failure_names_printer_in_title() {
        let n = connection_failed("HP");
        assert_eq!(n.title.as_deref(), Some("Connection to printer failed HP"));
        assert_eq!(n.kind, NotificationKind::Danger);
        assert!(!n.sticky);
    }

    #[test]
    fn completed_is_transient() {
        let n = completed("Zebra");
        assert_eq!(n.message, "Printing operation completed on printer Zebra");
        assert!(!n.sticky);
    }
}
