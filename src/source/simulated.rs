// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable in-memory device source.
//!
//! [`SimulatedSource`] implements [`DeviceSource`] without any
//! transport: tests and examples announce devices and push state
//! reports by hand, and the source drives the registered handlers
//! exactly like a discovery backend would.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::source::{
    DeviceAddedHandler, DeviceKey, DeviceSource, DeviceUpdate, DeviceUpdatedHandler, SourceDevice,
};
use crate::types::{DeviceType, SensorKey, SensorValues};

/// Relay mutation observed by a [`SimulatedDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    /// `turn_on` was invoked.
    On,
    /// `turn_off` was invoked.
    Off,
}

/// Mutable state behind a simulated device.
struct DeviceCell {
    state: bool,
    sensors: SensorValues,
    commands: Vec<RelayCommand>,
}

/// A device living inside a [`SimulatedSource`].
///
/// Records every relay command it receives so tests can assert on the
/// mutation order, and applies the command to its own state like a
/// real relay would.
pub struct SimulatedDevice {
    id: String,
    device_type: DeviceType,
    cell: Mutex<DeviceCell>,
}

impl SimulatedDevice {
    /// Creates a device of the given category, switched off and with
    /// no sensor readings.
    #[must_use]
    pub fn new(device_type: DeviceType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device_type,
            cell: Mutex::new(DeviceCell {
                state: false,
                sensors: SensorValues::new(),
                commands: Vec::new(),
            }),
        }
    }

    /// Shorthand for a relay device.
    #[must_use]
    pub fn relay(id: impl Into<String>) -> Self {
        Self::new(DeviceType::Relay, id)
    }

    /// Shorthand for a power-meter device.
    #[must_use]
    pub fn power_meter(id: impl Into<String>) -> Self {
        Self::new(DeviceType::PowerMeter, id)
    }

    /// Builder-style initial relay state.
    #[must_use]
    pub fn with_state(self, state: bool) -> Self {
        self.set_state(state);
        self
    }

    /// Builder-style initial sensor reading.
    #[must_use]
    pub fn with_sensor(self, key: SensorKey, value: f64) -> Self {
        self.set_sensor(key, value);
        self
    }

    /// Overwrites the relay state without recording a command.
    pub fn set_state(&self, state: bool) {
        self.cell.lock().state = state;
    }

    /// Stores a sensor reading.
    pub fn set_sensor(&self, key: SensorKey, value: f64) {
        self.cell.lock().sensors.insert(key, value);
    }

    /// Relay commands received so far, in invocation order.
    #[must_use]
    pub fn commands(&self) -> Vec<RelayCommand> {
        self.cell.lock().commands.clone()
    }

    /// Identity of this device.
    #[must_use]
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.device_type, self.id.clone())
    }
}

impl SourceDevice for SimulatedDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn state(&self) -> bool {
        self.cell.lock().state
    }

    fn sensor_values(&self) -> SensorValues {
        self.cell.lock().sensors.clone()
    }

    fn turn_on(&self) {
        let mut cell = self.cell.lock();
        cell.commands.push(RelayCommand::On);
        cell.state = true;
    }

    fn turn_off(&self) {
        let mut cell = self.cell.lock();
        cell.commands.push(RelayCommand::Off);
        cell.state = false;
    }
}

impl fmt::Debug for SimulatedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.lock();
        f.debug_struct("SimulatedDevice")
            .field("id", &self.id)
            .field("device_type", &self.device_type)
            .field("state", &cell.state)
            .field("commands", &cell.commands.len())
            .finish()
    }
}

/// Shared state of a [`SimulatedSource`] and its clones.
#[derive(Default)]
struct SimInner {
    devices: Mutex<HashMap<DeviceKey, Arc<SimulatedDevice>>>,
    added_handlers: Mutex<Vec<DeviceAddedHandler>>,
    update_handlers: Mutex<HashMap<DeviceKey, Vec<DeviceUpdatedHandler>>>,
    addresses: Mutex<Vec<String>>,
    starts: AtomicUsize,
    next_start_error: Mutex<Option<String>>,
}

/// Hand-driven [`DeviceSource`] for tests, examples and doctests.
///
/// Cloning is cheap and clones share all state, so a test can keep one
/// handle for scripting while a communicator owns another.
///
/// # Examples
///
/// ```
/// use shellyr_lib::{DeviceSource, DeviceUpdate, SimulatedSource};
///
/// let source = SimulatedSource::new();
/// source.add_device("192.168.1.40")?;
///
/// // Scripting: upsert a relay and report it as switched on.
/// source.push(DeviceUpdate::relay("shelly1-B4E842", true));
/// # Ok::<(), shellyr_lib::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct SimulatedSource {
    inner: Arc<SimInner>,
}

impl SimulatedSource {
    /// Creates an empty source with no devices or handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a device and fires the added handlers for it.
    ///
    /// Announcing a key that already exists keeps the stored device
    /// and fires the handlers again, mirroring backends that
    /// re-announce on every discovery cycle.
    pub fn announce(&self, device: SimulatedDevice) -> Arc<SimulatedDevice> {
        let key = device.key();
        let device = {
            let mut devices = self.inner.devices.lock();
            devices
                .entry(key.clone())
                .or_insert_with(|| Arc::new(device))
                .clone()
        };
        tracing::debug!(device = %key, "Announcing device");
        self.fire_added(&device);
        device
    }

    /// Fires the update handlers registered for this device.
    pub fn notify(&self, device: &SimulatedDevice) {
        let key = device.key();
        let handlers: Vec<DeviceUpdatedHandler> = {
            let map = self.inner.update_handlers.lock();
            map.get(&key).cloned().unwrap_or_default()
        };
        tracing::trace!(device = %key, handlers = handlers.len(), "Dispatching update");
        for handler in &handlers {
            handler(device);
        }
    }

    /// Applies a state report as an upsert and drives the handlers.
    ///
    /// Creates the device if its key is unknown (firing the added
    /// handlers), applies the report's state and sensor readings, then
    /// fires the update handlers. This is the one-line way to script a
    /// full report in tests.
    pub fn push(&self, update: DeviceUpdate) -> Arc<SimulatedDevice> {
        let key = update.key();
        let (device, is_new) = {
            let mut devices = self.inner.devices.lock();
            match devices.entry(key.clone()) {
                Entry::Occupied(entry) => (entry.get().clone(), false),
                Entry::Vacant(entry) => {
                    let device =
                        Arc::new(SimulatedDevice::new(update.device_type, update.id.clone()));
                    entry.insert(device.clone());
                    (device, true)
                }
            }
        };
        device.set_state(update.state);
        for (sensor, value) in update.sensor_values.iter() {
            device.set_sensor(sensor, value);
        }
        if is_new {
            tracing::debug!(device = %key, "Announcing device");
            self.fire_added(&device);
        }
        self.notify(&device);
        device
    }

    /// All devices currently stored, in unspecified order.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<SimulatedDevice>> {
        self.inner.devices.lock().values().cloned().collect()
    }

    /// Looks up a device by its key.
    #[must_use]
    pub fn device(&self, key: &DeviceKey) -> Option<Arc<SimulatedDevice>> {
        self.inner.devices.lock().get(key).cloned()
    }

    /// Addresses registered through [`DeviceSource::add_device`].
    #[must_use]
    pub fn added_addresses(&self) -> Vec<String> {
        self.inner.addresses.lock().clone()
    }

    /// Number of successful [`DeviceSource::start`] calls.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.inner.starts.load(Ordering::Relaxed)
    }

    /// Number of update handlers registered for this key.
    #[must_use]
    pub fn update_handler_count(&self, key: &DeviceKey) -> usize {
        self.inner
            .update_handlers
            .lock()
            .get(key)
            .map_or(0, Vec::len)
    }

    /// Makes the next [`DeviceSource::start`] call fail with the given
    /// message. Later calls succeed again.
    pub fn fail_next_start(&self, message: impl Into<String>) {
        *self.inner.next_start_error.lock() = Some(message.into());
    }

    // Handlers run after the lock is released so they may call back
    // into this source.
    fn fire_added(&self, device: &Arc<SimulatedDevice>) {
        let handlers: Vec<DeviceAddedHandler> = self.inner.added_handlers.lock().clone();
        for handler in &handlers {
            handler(device.as_ref());
        }
    }
}

impl DeviceSource for SimulatedSource {
    fn add_device(&self, address: &str) -> Result<()> {
        if address.trim().is_empty() {
            return Err(Error::InvalidAddress(address.to_string()));
        }
        self.inner.addresses.lock().push(address.to_string());
        Ok(())
    }

    fn on_device_added(&self, handler: DeviceAddedHandler) {
        self.inner.added_handlers.lock().push(handler);
    }

    fn on_device_updated(&self, key: &DeviceKey, handler: DeviceUpdatedHandler) {
        self.inner
            .update_handlers
            .lock()
            .entry(key.clone())
            .or_default()
            .push(handler);
    }

    fn start(&self) -> Result<()> {
        if let Some(message) = self.inner.next_start_error.lock().take() {
            return Err(Error::StartFailed(message));
        }
        self.inner.starts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl fmt::Debug for SimulatedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedSource")
            .field("devices", &self.inner.devices.lock().len())
            .field("starts", &self.start_count())
            .finish()
    }
}
