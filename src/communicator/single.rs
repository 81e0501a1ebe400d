// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-request communicator.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::communicator::completion::{CompletionFlag, CompletionHandle};
use crate::error::Result;
use crate::request::{PendingRequest, RequestAction, RequestSlot};
use crate::source::{DeviceKey, DeviceSource, SourceDevice};

/// Single-request façade over a device source.
///
/// Each operation registers one pending request: a target id suffix
/// plus an action to run once the source reports a matching device.
/// The suffix selects the device (`id.ends_with(suffix)`), so a short
/// tail like `"B4E842"` addresses `"shelly1-B4E842"` without spelling
/// out the full id.
///
/// # Last write wins
///
/// The register holds exactly one request. Registering an operation
/// while another is still pending silently discards the pending one,
/// callback included. Use [`QueuedCommunicator`] when several
/// operations must stay outstanding at once.
///
/// [`QueuedCommunicator`]: crate::QueuedCommunicator
///
/// # Examples
///
/// ```
/// use shellyr_lib::{Communicator, DeviceUpdate, SimulatedSource};
///
/// # fn main() -> shellyr_lib::Result<()> {
/// let source = SimulatedSource::new();
/// let communicator = Communicator::new(source.clone(), "192.168.1.40")?;
///
/// communicator.relay_state("B4E842", |state| {
///     println!("relay is {}", if state { "on" } else { "off" });
/// })?;
///
/// // The source reporting the device completes the request.
/// source.push(DeviceUpdate::relay("shelly1-B4E842", true));
/// assert!(!communicator.has_pending());
/// # Ok(())
/// # }
/// ```
pub struct Communicator<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: S,
    slot: RequestSlot,
    completion: CompletionFlag,
    subscribed: Mutex<HashSet<DeviceKey>>,
}

impl<S: DeviceSource> Communicator<S> {
    /// Wraps a source and registers the device at `address`.
    ///
    /// The communicator hooks into the source's added notifications
    /// and subscribes to updates of every announced device, once per
    /// distinct device key. The hook is attached before the address
    /// registers, so devices a source announces synchronously from
    /// `add_device` are seen as well.
    ///
    /// # Errors
    ///
    /// Returns the source's error when it rejects the address.
    pub fn new(source: S, address: &str) -> Result<Self> {
        let inner = Arc::new(Inner {
            source,
            slot: RequestSlot::new(),
            completion: CompletionFlag::new(),
            subscribed: Mutex::new(HashSet::new()),
        });

        // The hook must be in place before the address registers; a
        // source may announce devices synchronously from add_device.
        let weak = Arc::downgrade(&inner);
        inner.source.on_device_added(Arc::new(move |device| {
            if let Some(inner) = weak.upgrade() {
                inner.subscribe_device(device);
            }
        }));
        inner.source.add_device(address)?;

        tracing::debug!(address = %address, "Communicator ready");
        Ok(Self { inner })
    }

    /// Switches the matching relay on, without a completion callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartFailed`](crate::Error::StartFailed) when
    /// the source fails to start. The request stays registered; a
    /// later successful operation starts the source and the request
    /// completes normally.
    pub fn turn_on(&self, relay_id: &str) -> Result<()> {
        self.inner.register(relay_id, RequestAction::TurnOn(None))
    }

    /// Switches the matching relay on and runs `callback` afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub fn turn_on_with<F>(&self, relay_id: &str, callback: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .register(relay_id, RequestAction::TurnOn(Some(Box::new(callback))))
    }

    /// Switches the matching relay off, without a completion callback.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub fn turn_off(&self, relay_id: &str) -> Result<()> {
        self.inner.register(relay_id, RequestAction::TurnOff(None))
    }

    /// Switches the matching relay off and runs `callback` afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub fn turn_off_with<F>(&self, relay_id: &str, callback: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .register(relay_id, RequestAction::TurnOff(Some(Box::new(callback))))
    }

    /// Reads the matching relay's output state into `callback`.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub fn relay_state<F>(&self, relay_id: &str, callback: F) -> Result<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.inner
            .register(relay_id, RequestAction::RelayState(Box::new(callback)))
    }

    /// Reads the matching power meter's consumption (watts) into
    /// `callback`.
    ///
    /// The request only completes on a report that carries a
    /// consumption reading; reports without one leave it pending.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    pub fn power_consumption<F>(&self, powermeter_id: &str, callback: F) -> Result<()>
    where
        F: FnOnce(f64) + Send + 'static,
    {
        self.inner.register(
            powermeter_id,
            RequestAction::PowerConsumption(Box::new(callback)),
        )
    }

    /// Whether a request is waiting for its device.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.inner.slot.is_empty()
    }

    /// Handle that resolves when no request is pending.
    #[must_use]
    pub fn completion(&self) -> CompletionHandle {
        self.inner.completion.handle()
    }

    /// The wrapped source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }
}

impl<S: DeviceSource> Inner<S> {
    /// Stores the request and nudges the source's event loop.
    ///
    /// Starting is unconditional: every operation kicks the source so
    /// a stopped loop comes back up.
    fn register(&self, target: &str, action: RequestAction) -> Result<()> {
        let request = PendingRequest::new(target, action);
        tracing::debug!(
            request = %request.id(),
            method = %request.method(),
            target = %request.target(),
            "Registering request"
        );
        // Busy flips before the request becomes visible, so a dispatch
        // racing on another thread can only idle an emptied slot.
        self.completion.mark_busy();
        if let Some(displaced) = self.slot.replace(request) {
            tracing::debug!(displaced = %displaced.id(), "Displacing pending request");
        }
        self.source.start()
    }

    /// Subscribes to a device's updates, once per device key.
    fn subscribe_device(self: &Arc<Self>, device: &dyn SourceDevice) {
        let key = DeviceKey::of(device);
        if !self.subscribed.lock().insert(key.clone()) {
            tracing::trace!(device = %key, "Already subscribed");
            return;
        }
        tracing::debug!(device = %key, "Subscribing to device updates");

        let weak = Arc::downgrade(self);
        self.source.on_device_updated(
            &key,
            Arc::new(move |device| {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(device);
                }
            }),
        );
    }

    /// Runs the pending request against a matching device report.
    ///
    /// The request leaves the register before it runs, so a callback
    /// may register a follow-up without deadlocking or losing it.
    fn dispatch(&self, device: &dyn SourceDevice) {
        let Some(request) = self.slot.take_matching(device) else {
            tracing::debug!(device = %device.id(), "Update matched no pending request");
            return;
        };
        request.complete(device);
        if self.slot.is_empty() {
            self.completion.mark_idle();
        }
    }
}

impl<S> Clone for Communicator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for Communicator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Communicator")
            .field("pending", &!self.inner.slot.is_empty())
            .finish()
    }
}
