// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Queued communicator.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::communicator::completion::{CompletionFlag, CompletionHandle};
use crate::error::Result;
use crate::request::{PendingRequest, RequestAction, RequestQueue};
use crate::source::{DeviceKey, DeviceSource, SourceDevice};

/// Multi-request façade over a device source.
///
/// Works like [`Communicator`](crate::Communicator) but keeps every
/// registered request pending until its own matching report arrives,
/// so operations against several devices can be outstanding at once.
/// A report completes all requests it matches, in registration order.
///
/// The source's event loop is started once, on the first operation;
/// if starting fails the next operation tries again.
///
/// # Examples
///
/// ```
/// use shellyr_lib::{DeviceUpdate, QueuedCommunicator, SimulatedSource};
///
/// # fn main() -> shellyr_lib::Result<()> {
/// let source = SimulatedSource::new();
/// let communicator = QueuedCommunicator::new(source.clone(), "192.168.1.40")?;
///
/// communicator.turn_on("B4E842")?;
/// communicator.power_consumption("7C10", |watts| {
///     println!("drawing {watts} W");
/// })?;
/// assert_eq!(communicator.pending_requests(), 2);
///
/// source.push(DeviceUpdate::relay("shelly1-B4E842", false));
/// assert_eq!(communicator.pending_requests(), 1);
///
/// source.push(DeviceUpdate::power_meter("shellyplug-7C10", 42.0));
/// assert_eq!(communicator.pending_requests(), 0);
/// # Ok(())
/// # }
/// ```
pub struct QueuedCommunicator<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: S,
    queue: RequestQueue,
    completion: CompletionFlag,
    subscribed: Mutex<HashSet<DeviceKey>>,
    started: AtomicBool,
}

impl<S: DeviceSource> QueuedCommunicator<S> {
    /// Wraps a source and registers the device at `address`.
    ///
    /// # Errors
    ///
    /// Returns the source's error when it rejects the address.
    pub fn new(source: S, address: &str) -> Result<Self> {
        let inner = Arc::new(Inner {
            source,
            queue: RequestQueue::new(),
            completion: CompletionFlag::new(),
            subscribed: Mutex::new(HashSet::new()),
            started: AtomicBool::new(false),
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

        tracing::debug!(address = %address, "Queued communicator ready");
        Ok(Self { inner })
    }

    /// Switches the matching relay on, without a completion callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartFailed`](crate::Error::StartFailed) when
    /// the source's first start fails. The request stays queued and
    /// the next operation retries the start.
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

    /// Number of requests waiting for their device.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.queue.len()
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
    fn register(&self, target: &str, action: RequestAction) -> Result<()> {
        let request = PendingRequest::new(target, action);
        tracing::debug!(
            request = %request.id(),
            method = %request.method(),
            target = %request.target(),
            "Queueing request"
        );
        // Busy flips before the request becomes visible, so a dispatch
        // racing on another thread can only idle an emptied queue.
        self.completion.mark_busy();
        self.queue.push(request);
        self.ensure_started()
    }

    /// Starts the source on the first call; a failed start rearms the
    /// flag so a later operation can retry.
    fn ensure_started(&self) -> Result<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            if let Err(error) = self.source.start() {
                self.started.store(false, Ordering::SeqCst);
                return Err(error);
            }
        }
        Ok(())
    }

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

    /// Completes every request this report matches.
    ///
    /// Matched requests leave the queue before any of them runs, so
    /// callbacks may register follow-ups without deadlocking.
    fn dispatch(&self, device: &dyn SourceDevice) {
        let matched = self.queue.drain_matching(device);
        if matched.is_empty() {
            tracing::debug!(device = %device.id(), "Update matched no pending request");
            return;
        }
        tracing::debug!(
            device = %device.id(),
            matched = matched.len(),
            "Completing matched requests"
        );
        for request in matched {
            request.complete(device);
        }
        if self.queue.is_empty() {
            self.completion.mark_idle();
        }
    }
}

impl<S> Clone for QueuedCommunicator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for QueuedCommunicator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCommunicator")
            .field("pending_requests", &self.inner.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DeviceUpdate, RelayCommand, SimulatedSource};
    use crate::types::SensorKey;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn communicator(source: &SimulatedSource) -> QueuedCommunicator<SimulatedSource> {
        QueuedCommunicator::new(source.clone(), "192.168.1.40").unwrap()
    }

    #[test]
    fn requests_complete_independently() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);

        communicator.turn_on("B4E842").unwrap();
        communicator.turn_off("AABBCC").unwrap();
        assert_eq!(communicator.pending_requests(), 2);

        let first = source.push(DeviceUpdate::relay("shelly1-B4E842", false));
        assert_eq!(first.commands(), vec![RelayCommand::On]);
        assert_eq!(communicator.pending_requests(), 1);

        let second = source.push(DeviceUpdate::relay("shelly1-AABBCC", true));
        assert_eq!(second.commands(), vec![RelayCommand::Off]);
        assert_eq!(communicator.pending_requests(), 0);
    }

    #[test]
    fn one_report_completes_all_matching_requests() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);

        let reads = Arc::new(AtomicU32::new(0));
        for _ in 0..2 {
            let reads_clone = reads.clone();
            communicator
                .relay_state("B4E842", move |_| {
                    reads_clone.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        source.push(DeviceUpdate::relay("shelly1-B4E842", true));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(communicator.pending_requests(), 0);
    }

    #[test]
    fn starts_source_once() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);

        communicator.turn_on("a").unwrap();
        communicator.turn_off("b").unwrap();
        communicator.turn_on("c").unwrap();

        assert_eq!(source.start_count(), 1);
    }

    #[test]
    fn failed_start_can_be_retried() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);
        source.fail_next_start("broker unreachable");

        assert!(communicator.turn_on("B4E842").is_err());
        assert_eq!(communicator.pending_requests(), 1);
        assert_eq!(source.start_count(), 0);

        communicator.turn_off("B4E842").unwrap();
        assert_eq!(source.start_count(), 1);
        assert_eq!(communicator.pending_requests(), 2);
    }

    #[test]
    fn consumption_request_waits_for_reading() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);

        let watts_seen = Arc::new(AtomicU32::new(0));
        let watts_clone = watts_seen.clone();
        communicator
            .power_consumption("7C10", move |watts| {
                assert!((watts - 48.0).abs() < f64::EPSILON);
                watts_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        // Report without a consumption reading leaves it pending.
        let bare = DeviceUpdate {
            id: "shellyplug-7C10".to_string(),
            device_type: crate::types::DeviceType::PowerMeter,
            state: false,
            sensor_values: crate::types::SensorValues::new(),
        };
        source.push(bare);
        assert_eq!(communicator.pending_requests(), 1);

        source.push(DeviceUpdate::power_meter("shellyplug-7C10", 48.0));
        assert_eq!(watts_seen.load(Ordering::SeqCst), 1);
        assert_eq!(communicator.pending_requests(), 0);
    }

    #[test]
    fn callback_may_queue_followup() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);

        let chained = communicator.clone();
        communicator
            .relay_state("B4E842", move |state| {
                if state {
                    chained.turn_off("B4E842").unwrap();
                }
            })
            .unwrap();

        source.push(DeviceUpdate::relay("shelly1-B4E842", true));
        assert_eq!(communicator.pending_requests(), 1);

        let device = source.push(DeviceUpdate::relay("shelly1-B4E842", true));
        assert_eq!(device.commands(), vec![RelayCommand::Off]);
        assert_eq!(communicator.pending_requests(), 0);
    }

    #[tokio::test]
    async fn completion_resolves_after_last_request() {
        let source = SimulatedSource::new();
        let communicator = communicator(&source);
        let mut completion = communicator.completion();

        communicator.turn_on("B4E842").unwrap();
        communicator
            .power_consumption("7C10", |_| {})
            .unwrap();

        source.push(DeviceUpdate::relay("shelly1-B4E842", false));
        assert!(!completion.is_idle());

        source.push(
            DeviceUpdate::power_meter("shellyplug-7C10", 12.0)
                .with_sensor(SensorKey::Voltage, 230.0),
        );
        assert!(completion.wait().await);
    }
}
