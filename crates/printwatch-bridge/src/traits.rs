// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator trait definitions.
//
// The tracker never talks to a UI, an RPC layer or a push bus directly.
// Each of those is a trait here so that the host application plugs in its
// own implementation and tests plug in recording fakes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use printwatch_core::error::Result;
use printwatch_core::types::{
    DeviceDescriptor, DeviceRef, Notification, NotificationHandle, PrintId, PrintPayload,
};

/// Maps stored device references to concrete device descriptors.
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Resolve `refs`.  Fails with `PrintwatchError::Resolution` when the
    /// lookup itself fails; unknown references may simply be left out.
    async fn resolve(&self, refs: &[DeviceRef]) -> Result<Vec<DeviceDescriptor>>;
}

/// Dispatches a rendered job to the resolved devices.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Hand the job over for delivery.  Returning `Ok` means the job was
    /// accepted, not that it printed; devices confirm asynchronously.
    async fn submit(
        &self,
        print_id: &PrintId,
        devices: &[DeviceDescriptor],
        payload: &PrintPayload,
    ) -> Result<()>;
}

/// Surfaces messages to the user.
pub trait Notifier: Send + Sync {
    /// Display a notification and return a handle for dismissing it.
    fn show(&self, notification: Notification) -> NotificationHandle;

    /// Remove a previously shown notification.  Consumes the handle.
    fn dismiss(&self, handle: NotificationHandle);
}

/// Small persistent string map (the browser-local-storage equivalent).
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value.  Returns None if the key is not set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key.  Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Push channel delivering out-of-band events as raw JSON frames.
pub trait RealtimeChannel: Send + Sync {
    /// Join `channel` and return a receiver yielding every frame published
    /// on it from now on.
    fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<String>>;
}
