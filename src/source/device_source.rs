// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The injectable backend contract.

use std::sync::Arc;

use crate::error::Result;
use crate::source::{DeviceKey, SourceDevice};

/// Handler invoked when a source announces a device.
///
/// May fire more than once for the same device; registrations keyed on
/// [`DeviceKey`] must deduplicate on their side.
pub type DeviceAddedHandler = Arc<dyn Fn(&dyn SourceDevice) + Send + Sync>;

/// Handler invoked on every state report of one particular device.
pub type DeviceUpdatedHandler = Arc<dyn Fn(&dyn SourceDevice) + Send + Sync>;

/// Discovery and control backend a communicator drives.
///
/// The source owns the event loop: once [`start`](DeviceSource::start)
/// has been called it announces devices through the added handlers and
/// reports state through the per-device updated handlers, synchronously
/// from its own context. Implementations over a real transport do the
/// discovery and protocol work; [`SimulatedSource`](super::SimulatedSource)
/// scripts it for tests.
///
/// `start` may be called repeatedly; implementations treat repeated
/// calls as a no-op or a cheap nudge of an already running loop.
pub trait DeviceSource: Send + Sync + 'static {
    /// Registers a device by its network address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`](crate::Error::InvalidAddress)
    /// when the source rejects the address, or
    /// [`Error::Registration`](crate::Error::Registration) when
    /// registration fails for another reason.
    fn add_device(&self, address: &str) -> Result<()>;

    /// Registers a handler fired whenever a device is announced.
    fn on_device_added(&self, handler: DeviceAddedHandler);

    /// Registers a handler fired on every state report of the device
    /// identified by `key`.
    fn on_device_updated(&self, key: &DeviceKey, handler: DeviceUpdatedHandler);

    /// Starts (or nudges) the source's event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartFailed`](crate::Error::StartFailed) when
    /// the loop cannot be started.
    fn start(&self) -> Result<()>;
}
