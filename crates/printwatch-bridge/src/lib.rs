// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printwatch Bridge — the seams between the tracker and its host.
//
// `traits` defines what the tracker needs from the outside world (device
// lookup, job dispatch, notifications, storage, push events).  `local`
// provides in-process implementations for headless use and tests.

pub mod local;
pub mod traits;

pub use local::{LocalChannel, LogNotifier, MemoryStore};
pub use traits::{DeviceResolver, JobSubmitter, KeyValueStore, Notifier, RealtimeChannel};
