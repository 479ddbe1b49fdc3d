// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job tracker — correlates asynchronous device confirmations with the
// jobs that caused them.
//
// Lifecycle of a job:
//
//   submit_job ──► resolve devices ──► one sticky "sending" notification
//                                      per device ──► deadline timer ──► submit
//
//   on_confirmation(device) ──► dismiss its notification, show success,
//                               drop the ticket; last ticket ends the job
//
//   deadline ──► every ticket still present is dismissed and reported as a
//                connection failure; the job is dropped
//
// A ticket's notification handle is released by exactly one of those paths.
// The pending-job map is the only state shared between jobs; notifier calls
// are always made after its lock is released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

use printwatch_bridge::{DeviceResolver, JobSubmitter, KeyValueStore, Notifier};
use printwatch_core::TrackerConfig;
use printwatch_core::error::{PrintwatchError, Result};
use printwatch_core::messages;
use printwatch_core::types::{
    DeviceDescriptor, DeviceRef, DeviceTicket, Notification, NotificationHandle,
    PendingJobSnapshot, PrintId, PrintPayload, ReportId,
};

use crate::preferences::ReportPreferences;

/// External services the tracker depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn DeviceResolver>,
    pub submitter: Arc<dyn JobSubmitter>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn KeyValueStore>,
}

/// A job waiting for device confirmations.
struct PendingJob {
    /// Distinguishes this registration from an earlier job that used the
    /// same print id.
    generation: u64,
    /// Keyed by device identifier, in submission order.
    tickets: IndexMap<String, DeviceTicket>,
    submitted_at: DateTime<Utc>,
    deadline: Option<AbortHandle>,
}

impl PendingJob {
    fn cancel_deadline(&mut self) {
        if let Some(deadline) = self.deadline.take() {
            deadline.abort();
        }
    }

    fn snapshot(&self, print_id: &PrintId) -> PendingJobSnapshot {
        PendingJobSnapshot {
            print_id: print_id.clone(),
            devices: self
                .tickets
                .values()
                .map(|t| (t.device_id.clone(), t.display_name.clone()))
                .collect(),
            submitted_at: self.submitted_at,
        }
    }
}

struct TrackerInner {
    jobs: Mutex<HashMap<PrintId, PendingJob>>,
    next_generation: AtomicU64,
    resolver: Arc<dyn DeviceResolver>,
    submitter: Arc<dyn JobSubmitter>,
    notifier: Arc<dyn Notifier>,
    preferences: ReportPreferences,
    config: TrackerConfig,
}

/// Tracks in-flight print jobs until every device confirms or the
/// confirmation deadline passes.
///
/// Cheap to clone; clones share the same pending-job map.
#[derive(Clone)]
pub struct PrintJobTracker {
    inner: Arc<TrackerInner>,
}

impl PrintJobTracker {
    pub fn new(config: TrackerConfig, collaborators: Collaborators) -> Self {
        let preferences =
            ReportPreferences::new(collaborators.store, config.preference_key.clone());
        Self {
            inner: Arc::new(TrackerInner {
                jobs: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                resolver: collaborators.resolver,
                submitter: collaborators.submitter,
                notifier: collaborators.notifier,
                preferences,
                config,
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn preferences(&self) -> &ReportPreferences {
        &self.inner.preferences
    }

    /// Resolve `refs`, register a pending job under `print_id` and hand it
    /// to the submitter.
    ///
    /// Returns once the submitter has accepted (or rejected) the job;
    /// confirmations arrive later through [`Self::on_confirmation`].
    ///
    /// On resolution failure the remembered selection for the payload's
    /// report is dropped and nothing is registered.  On submission failure
    /// the job stays pending until its deadline unless
    /// `teardown_on_submit_failure` is set.
    #[instrument(skip(self, refs, payload), fields(print_id = %print_id, report_id = %payload.report_id))]
    pub async fn submit_job(
        &self,
        print_id: PrintId,
        refs: &[DeviceRef],
        payload: &PrintPayload,
    ) -> Result<()> {
        let devices = match self.inner.resolver.resolve(refs).await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "device resolution failed");
                if let Err(store_err) = self.inner.preferences.forget(payload.report_id) {
                    warn!(error = %store_err, "could not drop remembered selection");
                }
                return Err(match e {
                    e @ PrintwatchError::Resolution(_) => e,
                    other => PrintwatchError::Resolution(other.to_string()),
                });
            }
        };

        let generation = TrackerInner::register(&self.inner, &print_id, &devices);

        if let Err(e) = self
            .inner
            .submitter
            .submit(&print_id, &devices, payload)
            .await
        {
            warn!(error = %e, "job submission failed");
            if self.inner.config.teardown_on_submit_failure {
                self.inner.teardown(&print_id, generation);
            }
            return Err(match e {
                e @ PrintwatchError::Submission(_) => e,
                other => PrintwatchError::Submission(other.to_string()),
            });
        }

        info!(devices = devices.len(), "job submitted, awaiting confirmations");
        Ok(())
    }

    /// Store `refs` as the selection for the payload's report, then submit.
    pub async fn remember_selection(
        &self,
        print_id: PrintId,
        refs: &[DeviceRef],
        payload: &PrintPayload,
    ) -> Result<()> {
        self.inner.preferences.remember(payload.report_id, refs)?;
        self.submit_job(print_id, refs, payload).await
    }

    /// Last device selection remembered for `report_id`.
    pub fn last_selection(&self, report_id: ReportId) -> Result<Option<Vec<DeviceRef>>> {
        self.inner.preferences.lookup(report_id)
    }

    /// A device reported that it finished its part of `print_id`.
    ///
    /// Unknown jobs and devices (late, duplicate or foreign confirmations)
    /// are ignored.
    pub fn on_confirmation(&self, print_id: &PrintId, device_id: &str) {
        let (ticket, finished) = {
            let mut jobs = self.inner.jobs();
            let Some(job) = jobs.get_mut(print_id) else {
                debug!(%print_id, device_id, "confirmation for unknown job ignored");
                return;
            };
            let Some(ticket) = job.tickets.shift_remove(device_id) else {
                debug!(%print_id, device_id, "confirmation for unknown device ignored");
                return;
            };
            let finished = if job.tickets.is_empty() {
                jobs.remove(print_id)
            } else {
                None
            };
            (ticket, finished)
        };

        info!(%print_id, device_id, "device confirmed print job");
        self.inner.notifier.dismiss(ticket.notification);
        self.inner
            .notifier
            .show(messages::completed(&ticket.display_name));

        if let Some(mut job) = finished {
            job.cancel_deadline();
            info!(%print_id, "all devices confirmed");
        }
    }

    pub fn is_pending(&self, print_id: &PrintId) -> bool {
        self.inner.jobs().contains_key(print_id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.jobs().len()
    }

    pub fn pending_job(&self, print_id: &PrintId) -> Option<PendingJobSnapshot> {
        self.inner
            .jobs()
            .get(print_id)
            .map(|job| job.snapshot(print_id))
    }

    pub(crate) fn notify(&self, notification: Notification) -> NotificationHandle {
        self.inner.notifier.show(notification)
    }
}

impl TrackerInner {
    fn jobs(&self) -> MutexGuard<'_, HashMap<PrintId, PendingJob>> {
        // Nothing panics while holding the lock, but a poisoned map is still
        // structurally valid.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create tickets and notifications for `devices`, insert the job and
    /// arm its deadline.  Returns the job's generation.
    fn register(this: &Arc<Self>, print_id: &PrintId, devices: &[DeviceDescriptor]) -> u64 {
        let generation = this.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut tickets = IndexMap::with_capacity(devices.len());
        for device in devices {
            if tickets.contains_key(&device.identifier) {
                warn!(%print_id, device_id = %device.identifier, "device listed twice, tracking once");
                continue;
            }
            let notification = this.notifier.show(messages::sending(&device.display_name));
            tickets.insert(
                device.identifier.clone(),
                DeviceTicket {
                    device_id: device.identifier.clone(),
                    display_name: device.display_name.clone(),
                    notification,
                },
            );
        }

        if tickets.is_empty() {
            warn!(%print_id, "no devices resolved, nothing to track");
            let replaced = this.jobs().remove(print_id);
            if let Some(old) = replaced {
                warn!(%print_id, "print id reused while still pending, dropping job");
                this.discard(old);
            }
            return generation;
        }

        let job = PendingJob {
            generation,
            tickets,
            submitted_at: Utc::now(),
            deadline: None,
        };
        let replaced = this.jobs().insert(print_id.clone(), job);

        if let Some(old) = replaced {
            warn!(%print_id, "print id reused while still pending, replacing job");
            this.discard(old);
        }

        let deadline = Self::arm_deadline(
            Arc::downgrade(this),
            print_id.clone(),
            generation,
            this.config.confirmation_timeout(),
        );
        if let Some(job) = this
            .jobs()
            .get_mut(print_id)
            .filter(|job| job.generation == generation)
        {
            job.deadline = Some(deadline);
        }

        debug!(%print_id, generation, "job registered");
        generation
    }

    fn arm_deadline(
        this: Weak<Self>,
        print_id: PrintId,
        generation: u64,
        timeout: std::time::Duration,
    ) -> AbortHandle {
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = this.upgrade() {
                inner.expire(&print_id, generation);
            }
        })
        .abort_handle()
    }

    /// Deadline passed: report every unconfirmed device and drop the job.
    fn expire(&self, print_id: &PrintId, generation: u64) {
        let job = {
            let mut jobs = self.jobs();
            match jobs.get(print_id) {
                Some(job) if job.generation == generation => jobs.remove(print_id),
                _ => None,
            }
        };
        let Some(job) = job else {
            debug!(%print_id, "deadline passed for a job that already finished");
            return;
        };

        warn!(%print_id, unconfirmed = job.tickets.len(), "confirmation deadline passed");
        for (_, ticket) in job.tickets {
            self.notifier.dismiss(ticket.notification);
            self.notifier
                .show(messages::connection_failed(&ticket.display_name));
        }
    }

    /// Drop a job without reporting failures (submission already failed).
    fn teardown(&self, print_id: &PrintId, generation: u64) {
        let job = {
            let mut jobs = self.jobs();
            match jobs.get(print_id) {
                Some(job) if job.generation == generation => jobs.remove(print_id),
                _ => None,
            }
        };
        if let Some(job) = job {
            self.discard(job);
            debug!(%print_id, "job torn down after failed submission");
        }
    }

    /// Stop a job's deadline and dismiss its sending notifications without
    /// reporting any failure.
    fn discard(&self, mut job: PendingJob) {
        job.cancel_deadline();
        for (_, ticket) in job.tickets {
            self.notifier.dismiss(ticket.notification);
        }
    }

    #[cfg(test)]
    fn armed_deadlines(self: &Arc<Self>) -> usize {
        // Every live deadline task holds one weak reference.
        Arc::weak_count(self)
    }
}
