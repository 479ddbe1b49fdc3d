// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording fakes for the tracker's collaborators (test builds only).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use printwatch_bridge::{DeviceResolver, JobSubmitter, MemoryStore, Notifier};
use printwatch_core::TrackerConfig;
use printwatch_core::error::{PrintwatchError, Result};
use printwatch_core::types::{
    DeviceDescriptor, DeviceRef, Notification, NotificationHandle, NotificationKind, PrintId,
    PrintPayload,
};

use crate::preferences::ReportPreferences;
use crate::tracker::{Collaborators, PrintJobTracker};

pub(crate) fn device(id: &str, name: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(id, name)
}

#[derive(Debug, Clone)]
pub(crate) enum NotifierEvent {
    Shown(u64, Notification),
    Dismissed(u64),
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    next: AtomicU64,
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub(crate) fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub(crate) fn events_len(&self) -> usize {
        self.events.lock().expect("events lock").len()
    }

    pub(crate) fn shown(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NotifierEvent::Shown(_, n) => Some(n),
                NotifierEvent::Dismissed(_) => None,
            })
            .collect()
    }

    pub(crate) fn shown_of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.shown().into_iter().filter(|n| n.kind == kind).collect()
    }

    pub(crate) fn dismissed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, NotifierEvent::Dismissed(_)))
            .count()
    }

    /// Every dismissed handle was shown, sticky, and dismissed only once.
    pub(crate) fn assert_each_dismissed_once(&self) {
        let events = self.events();
        let mut dismissals: HashMap<u64, usize> = HashMap::new();
        for event in &events {
            if let NotifierEvent::Dismissed(handle) = event {
                *dismissals.entry(*handle).or_default() += 1;
            }
        }
        for (handle, count) in dismissals {
            assert_eq!(count, 1, "handle {handle} dismissed {count} times");
            let sticky = events.iter().any(|e| {
                matches!(e, NotifierEvent::Shown(h, n) if *h == handle && n.sticky)
            });
            assert!(sticky, "handle {handle} was not a sticky notification");
        }
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) -> NotificationHandle {
        let handle = self.next.fetch_add(1, Ordering::Relaxed);
        self.events
            .lock()
            .expect("events lock")
            .push(NotifierEvent::Shown(handle, notification));
        NotificationHandle(handle)
    }

    fn dismiss(&self, handle: NotificationHandle) {
        self.events
            .lock()
            .expect("events lock")
            .push(NotifierEvent::Dismissed(handle.0));
    }
}

#[derive(Default)]
pub(crate) struct FakeResolver {
    devices: Mutex<Vec<DeviceDescriptor>>,
    fail: AtomicBool,
}

impl FakeResolver {
    pub(crate) fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
        *self.devices.lock().expect("devices lock") = devices;
    }
}

#[async_trait]
impl DeviceResolver for FakeResolver {
    async fn resolve(&self, _refs: &[DeviceRef]) -> Result<Vec<DeviceDescriptor>> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(PrintwatchError::Resolution("device lookup rejected".into()));
        }
        Ok(self.devices.lock().expect("devices lock").clone())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SubmitCall {
    pub print_id: PrintId,
    pub device_ids: Vec<String>,
    /// Notifications on screen when the submitter was reached.
    pub notifications_shown: usize,
    /// Remembered selection for the payload's report at submission time.
    pub selection_stored: Option<Vec<DeviceRef>>,
}

pub(crate) struct RecordingSubmitter {
    notifier: Arc<RecordingNotifier>,
    preferences: ReportPreferences,
    calls: Mutex<Vec<SubmitCall>>,
    fail: AtomicBool,
}

impl RecordingSubmitter {
    pub(crate) fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl JobSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        print_id: &PrintId,
        devices: &[DeviceDescriptor],
        payload: &PrintPayload,
    ) -> Result<()> {
        let call = SubmitCall {
            print_id: print_id.clone(),
            device_ids: devices.iter().map(|d| d.identifier.clone()).collect(),
            notifications_shown: self.notifier.shown().len(),
            selection_stored: self.preferences.lookup(payload.report_id)?,
        };
        self.calls.lock().expect("calls lock").push(call);

        if self.fail.load(Ordering::Relaxed) {
            return Err(PrintwatchError::Submission("render_and_send returned 500".into()));
        }
        Ok(())
    }
}

/// A tracker wired to recording fakes.
pub(crate) struct Harness {
    pub tracker: PrintJobTracker,
    pub notifier: Arc<RecordingNotifier>,
    pub resolver: Arc<FakeResolver>,
    pub submitter: Arc<RecordingSubmitter>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub(crate) fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self::with_config(devices, TrackerConfig::default())
    }

    pub(crate) fn with_config(devices: Vec<DeviceDescriptor>, config: TrackerConfig) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = Arc::new(FakeResolver::default());
        resolver.set_devices(devices);
        let store = Arc::new(MemoryStore::new());
        let submitter = Arc::new(RecordingSubmitter {
            notifier: notifier.clone(),
            preferences: ReportPreferences::new(store.clone(), config.preference_key.clone()),
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        });

        let tracker = PrintJobTracker::new(
            config,
            Collaborators {
                resolver: resolver.clone(),
                submitter: submitter.clone(),
                notifier: notifier.clone(),
                store: store.clone(),
            },
        );

        Self {
            tracker,
            notifier,
            resolver,
            submitter,
            store,
        }
    }

    pub(crate) fn failing_resolver() -> Self {
        let harness = Self::new(Vec::new());
        harness.resolver.fail.store(true, Ordering::Relaxed);
        harness
    }

    pub(crate) fn with_failing_submitter(self) -> Self {
        self.submitter.fail.store(true, Ordering::Relaxed);
        self
    }
}
