// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request methods a communicator can register.

use std::fmt;

use crate::types::DeviceType;

/// What a pending request asks of its device.
///
/// The method fixes the device category the request can match:
/// relay commands and state reads only match [`DeviceType::Relay`],
/// consumption reads only match [`DeviceType::PowerMeter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    /// Switch the relay on.
    TurnOn,
    /// Switch the relay off.
    TurnOff,
    /// Read the relay's output state.
    RelayState,
    /// Read the power meter's consumption.
    PowerConsumption,
}

impl Method {
    /// Lowercase name used in logs.
    #[must_use]
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::RelayState => "relay_state",
            Self::PowerConsumption => "power_consumption",
        }
    }

    /// Device category this method dispatches against.
    #[must_use]
    pub(crate) const fn expected_device_type(&self) -> DeviceType {
        match self {
            Self::TurnOn | Self::TurnOff | Self::RelayState => DeviceType::Relay,
            Self::PowerConsumption => DeviceType::PowerMeter,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
