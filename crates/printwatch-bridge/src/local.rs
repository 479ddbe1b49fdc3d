// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process collaborator implementations.
//
// Used when the tracker runs without a UI (headless services, CI) and as the
// default wiring in tests.  Notifications become tracing events, the store
// is a HashMap, and the realtime channel is a set of tokio mpsc senders.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use printwatch_core::error::{PrintwatchError, Result};
use printwatch_core::types::{Notification, NotificationHandle, NotificationKind};

use crate::traits::{KeyValueStore, Notifier, RealtimeChannel};

/// Buffered frames per subscriber before publishers start dropping.
const SUBSCRIBER_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Notifier that writes every notification to the log.
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_handle: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for LogNotifier {
    fn show(&self, notification: Notification) -> NotificationHandle {
        let handle = NotificationHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let title = notification.title.as_deref().unwrap_or("");
        match notification.kind {
            NotificationKind::Info | NotificationKind::Success => {
                info!(%handle, title, sticky = notification.sticky, "{}", notification.message)
            }
            NotificationKind::Warning => {
                warn!(%handle, title, sticky = notification.sticky, "{}", notification.message)
            }
            NotificationKind::Danger => {
                error!(%handle, title, sticky = notification.sticky, "{}", notification.message)
            }
        }
        handle
    }

    fn dismiss(&self, handle: NotificationHandle) {
        debug!(%handle, "notification dismissed");
    }
}

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

/// Volatile key-value store.  Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PrintwatchError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Realtime channel
// ---------------------------------------------------------------------------

/// In-process publish/subscribe channel.
#[derive(Debug, Default)]
pub struct LocalChannel {
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<String>>>>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `frame` to every live subscriber of `channel`.
    ///
    /// Returns how many subscribers received it.  Closed subscribers are
    /// pruned; full ones miss the frame.
    pub fn publish(&self, channel: &str, frame: impl Into<String>) -> usize {
        let frame = frame.into();
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return 0;
        };
        let Some(senders) = subscribers.get_mut(channel) else {
            debug!(channel, "publish on channel without subscribers");
            return 0;
        };

        let mut delivered = 0;
        senders.retain(|tx| match tx.try_send(frame.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(channel, "subscriber lagging, frame dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }
}

impl RealtimeChannel for LocalChannel {
    fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.subscribers
            .lock()
            .map_err(|_| PrintwatchError::Channel("subscriber table lock poisoned".into()))?
            .entry(channel.to_string())
            .or_default()
            .push(tx);
        info!(channel, "subscribed to realtime channel");
        Ok(rx)
    }
}
