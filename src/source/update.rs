// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot of a device's reported state.

use serde::{Deserialize, Serialize};

use crate::source::{DeviceKey, SourceDevice};
use crate::types::{DeviceType, SensorKey, SensorValues};

/// One observed state report of a device.
///
/// Plain data: everything a source tells its handlers about a device,
/// detached from the handler's borrow. Also the scripting payload for
/// [`SimulatedSource::push`](super::SimulatedSource::push), where it is
/// applied as an upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    /// Identifier assigned by the source.
    pub id: String,
    /// Category of the device.
    pub device_type: DeviceType,
    /// Relay output state.
    #[serde(default)]
    pub state: bool,
    /// Sensor readings carried by this report.
    #[serde(default)]
    pub sensor_values: SensorValues,
}

impl DeviceUpdate {
    /// Report of a relay with the given output state.
    #[must_use]
    pub fn relay(id: impl Into<String>, state: bool) -> Self {
        Self {
            id: id.into(),
            device_type: DeviceType::Relay,
            state,
            sensor_values: SensorValues::new(),
        }
    }

    /// Report of a power meter with the given consumption reading.
    #[must_use]
    pub fn power_meter(id: impl Into<String>, consumption: f64) -> Self {
        Self {
            id: id.into(),
            device_type: DeviceType::PowerMeter,
            state: false,
            sensor_values: SensorValues::new().with(SensorKey::Consumption, consumption),
        }
    }

    /// Snapshots the current state of a device handle.
    #[must_use]
    pub fn from_device(device: &dyn SourceDevice) -> Self {
        Self {
            id: device.id().to_string(),
            device_type: device.device_type(),
            state: device.state(),
            sensor_values: device.sensor_values(),
        }
    }

    /// Builder-style sensor reading.
    #[must_use]
    pub fn with_sensor(mut self, key: SensorKey, value: f64) -> Self {
        self.sensor_values.insert(key, value);
        self
    }

    /// Identity of the reported device.
    #[must_use]
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.device_type, self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_report_carries_state() {
        let update = DeviceUpdate::relay("shelly1-B4E842", true);
        assert_eq!(update.device_type, DeviceType::Relay);
        assert!(update.state);
        assert!(update.sensor_values.is_empty());
    }

    #[test]
    fn power_meter_report_carries_consumption() {
        let update = DeviceUpdate::power_meter("shellyplug-7C10", 48.5);
        assert_eq!(update.sensor_values.consumption(), Some(48.5));
    }

    #[test]
    fn key_pairs_type_with_id() {
        let update = DeviceUpdate::relay("dev-1", false);
        assert_eq!(update.key(), DeviceKey::new(DeviceType::Relay, "dev-1"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let update: DeviceUpdate =
            serde_json::from_str("{\"id\":\"dev-1\",\"device_type\":\"RELAY\"}").unwrap();
        assert!(!update.state);
        assert!(update.sensor_values.is_empty());
    }

    #[test]
    fn serde_round_trip() {
        let update = DeviceUpdate::power_meter("plug-1", 60.0).with_sensor(SensorKey::Voltage, 230.1);
        let json = serde_json::to_string(&update).unwrap();
        let back: DeviceUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }
}
