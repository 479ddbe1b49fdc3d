// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printwatch Tracker — print job correlation and confirmation deadlines.
// Bridges the user's device selection, the job submitter, and the
// confirmations that devices push back over the realtime channel.

pub mod confirmation;
pub mod preferences;
pub mod selection;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use confirmation::ConfirmationListener;
pub use preferences::ReportPreferences;
pub use selection::PrinterSelection;
pub use tracker::{Collaborators, PrintJobTracker};
