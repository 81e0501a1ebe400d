// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device handle and identity types.

use std::fmt;

use crate::types::{DeviceType, SensorValues};

/// A device as seen through a [`DeviceSource`](super::DeviceSource).
///
/// Implementations hand out references to this trait from their added
/// and updated handlers. Accessors return a snapshot of the device's
/// last reported state; the mutations are fire-and-forget, transport
/// failures stay inside the source.
pub trait SourceDevice: Send + Sync {
    /// Stable identifier assigned by the source, e.g. `"shelly1-B4E842"`.
    fn id(&self) -> &str;

    /// Category the source assigned to this device.
    fn device_type(&self) -> DeviceType;

    /// Relay output state from the last report.
    fn state(&self) -> bool;

    /// Sensor readings from the last report.
    fn sensor_values(&self) -> SensorValues;

    /// Switches the relay output on.
    fn turn_on(&self);

    /// Switches the relay output off.
    fn turn_off(&self);
}

/// Identity of a device within a source: its category plus its id.
///
/// Two announcements with the same key refer to the same physical
/// device, so per-device registrations are deduplicated on this key.
///
/// # Examples
///
/// ```
/// use shellyr_lib::{DeviceKey, DeviceType};
///
/// let key = DeviceKey::new(DeviceType::Relay, "shelly1-B4E842");
/// assert_eq!(key.to_string(), "RELAY/shelly1-B4E842");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceKey {
    device_type: DeviceType,
    id: String,
}

impl DeviceKey {
    /// Creates a key from a category and a device id.
    #[must_use]
    pub fn new(device_type: DeviceType, id: impl Into<String>) -> Self {
        Self {
            device_type,
            id: id.into(),
        }
    }

    /// Reads the key of a device handle.
    #[must_use]
    pub fn of(device: &dyn SourceDevice) -> Self {
        Self::new(device.device_type(), device.id())
    }

    /// The device's category.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// The device's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_type, self.id)
    }
}
