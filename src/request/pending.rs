// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pending requests and their one-shot callbacks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::request::Method;
use crate::source::SourceDevice;

/// One-shot callback for a relay command.
pub(crate) type CommandCallback = Box<dyn FnOnce() + Send + 'static>;

/// One-shot callback receiving a relay's output state.
pub(crate) type StateCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// One-shot callback receiving a consumption reading in watts.
pub(crate) type ReadingCallback = Box<dyn FnOnce(f64) + Send + 'static>;

/// What to do with the device once a request matches.
///
/// Command callbacks are optional; read callbacks are the whole point
/// of their request, so the type makes them mandatory.
pub(crate) enum RequestAction {
    TurnOn(Option<CommandCallback>),
    TurnOff(Option<CommandCallback>),
    RelayState(StateCallback),
    PowerConsumption(ReadingCallback),
}

impl RequestAction {
    pub(crate) fn method(&self) -> Method {
        match self {
            Self::TurnOn(_) => Method::TurnOn,
            Self::TurnOff(_) => Method::TurnOff,
            Self::RelayState(_) => Method::RelayState,
            Self::PowerConsumption(_) => Method::PowerConsumption,
        }
    }
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a pending request, unique within the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Req({})", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Req({})", self.0)
    }
}

/// A registered request waiting for a matching device report.
///
/// Matching is two-fold: the device's category must equal the
/// method's expected category, and the device id must end with the
/// request's target suffix. Completion consumes the request, so each
/// callback fires at most once.
pub(crate) struct PendingRequest {
    id: RequestId,
    target: String,
    action: RequestAction,
}

impl PendingRequest {
    pub(crate) fn new(target: impl Into<String>, action: RequestAction) -> Self {
        Self {
            id: RequestId::next(),
            target: target.into(),
            action,
        }
    }

    pub(crate) fn id(&self) -> RequestId {
        self.id
    }

    pub(crate) fn method(&self) -> Method {
        self.action.method()
    }

    pub(crate) fn target(&self) -> &str {
        &self.target
    }

    /// Whether this device report can complete the request.
    ///
    /// An empty target suffix matches no device. Consumption reads
    /// additionally require the report to carry a consumption value;
    /// without one the request stays pending for a later report.
    pub(crate) fn matches(&self, device: &dyn SourceDevice) -> bool {
        if self.target.is_empty() {
            return false;
        }
        if device.device_type() != self.method().expected_device_type() {
            return false;
        }
        if !device.id().ends_with(&self.target) {
            return false;
        }
        if matches!(self.action, RequestAction::PowerConsumption(_))
            && device.sensor_values().consumption().is_none()
        {
            return false;
        }
        true
    }

    /// Runs the request against a matched device.
    ///
    /// Relay commands mutate the device first and fire the callback
    /// after, so the callback observes the commanded device.
    pub(crate) fn complete(self, device: &dyn SourceDevice) {
        tracing::debug!(
            request = %self.id,
            method = %self.method(),
            device = %device.id(),
            "Completing request"
        );
        match self.action {
            RequestAction::TurnOn(callback) => {
                device.turn_on();
                if let Some(callback) = callback {
                    callback();
                }
            }
            RequestAction::TurnOff(callback) => {
                device.turn_off();
                if let Some(callback) = callback {
                    callback();
                }
            }
            RequestAction::RelayState(callback) => {
                callback(device.state());
            }
            RequestAction::PowerConsumption(callback) => {
                // matches() checked the reading; re-read in case the
                // device mutated since.
                if let Some(consumption) = device.sensor_values().consumption() {
                    callback(consumption);
                } else {
                    tracing::debug!(
                        device = %device.id(),
                        "Consumption reading gone before completion"
                    );
                }
            }
        }
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("method", &self.method().as_str())
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RelayCommand, SimulatedDevice};
    use crate::types::SensorKey;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    fn state_request(target: &str) -> PendingRequest {
        PendingRequest::new(target, RequestAction::RelayState(Box::new(|_| {})))
    }

    #[test]
    fn suffix_selects_device() {
        let device = SimulatedDevice::relay("shelly1-B4E842");
        assert!(state_request("842").matches(&device));
        assert!(state_request("shelly1-B4E842").matches(&device));
        assert!(!state_request("843").matches(&device));
    }

    #[test]
    fn empty_target_matches_nothing() {
        let device = SimulatedDevice::relay("shelly1-B4E842");
        assert!(!state_request("").matches(&device));
    }

    #[test]
    fn category_mismatch_never_matches() {
        let meter = SimulatedDevice::power_meter("shellyplug-7C10");
        assert!(!state_request("7C10").matches(&meter));

        let relay = SimulatedDevice::relay("shelly1-B4E842");
        let read = PendingRequest::new("842", RequestAction::PowerConsumption(Box::new(|_| {})));
        assert!(!read.matches(&relay));
    }

    #[test]
    fn consumption_read_requires_reading() {
        let meter = SimulatedDevice::power_meter("plug-1");
        let read = PendingRequest::new("plug-1", RequestAction::PowerConsumption(Box::new(|_| {})));
        assert!(!read.matches(&meter));

        meter.set_sensor(SensorKey::Consumption, 12.0);
        assert!(read.matches(&meter));
    }

    #[test]
    fn command_runs_before_callback() {
        let device = Arc::new(SimulatedDevice::relay("dev-1"));
        let observed = Arc::new(AtomicU32::new(0));

        let device_in_callback = device.clone();
        let observed_clone = observed.clone();
        let request = PendingRequest::new(
            "dev-1",
            RequestAction::TurnOn(Some(Box::new(move || {
                assert_eq!(device_in_callback.commands(), vec![RelayCommand::On]);
                observed_clone.fetch_add(1, Ordering::SeqCst);
            }))),
        );

        request.complete(device.as_ref());
        assert_eq!(observed.load(Ordering::SeqCst), 1);
        assert!(device.state());
    }

    #[test]
    fn command_without_callback_still_mutates() {
        let device = SimulatedDevice::relay("dev-1");
        PendingRequest::new("dev-1", RequestAction::TurnOff(None)).complete(&device);
        assert_eq!(device.commands(), vec![RelayCommand::Off]);
    }

    #[test]
    fn state_read_reports_current_state() {
        let device = SimulatedDevice::relay("dev-1").with_state(true);
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = seen.clone();

        let request = PendingRequest::new(
            "dev-1",
            RequestAction::RelayState(Box::new(move |state| {
                assert!(state);
                seen_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );
        request.complete(&device);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn consumption_read_reports_reading() {
        let device = SimulatedDevice::power_meter("plug-1").with_sensor(SensorKey::Consumption, 48.5);
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = seen.clone();

        let request = PendingRequest::new(
            "plug-1",
            RequestAction::PowerConsumption(Box::new(move |watts| {
                assert!((watts - 48.5).abs() < f64::EPSILON);
                seen_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );
        request.complete(&device);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ids_are_unique() {
        let a = state_request("x");
        let b = state_request("x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn debug_skips_callback() {
        let request = state_request("dev-1");
        let debug = format!("{request:?}");
        assert!(debug.contains("relay_state"));
        assert!(debug.contains("dev-1"));
    }
}
