// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-request register with replace-in-place semantics.

use parking_lot::Mutex;

use crate::request::PendingRequest;
use crate::source::SourceDevice;

/// Holds at most one pending request. Storing a new request displaces
/// the old one, so the last registration wins.
#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    current: Mutex<Option<PendingRequest>>,
}

impl RequestSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a request, returning the one it displaced.
    pub(crate) fn replace(&self, request: PendingRequest) -> Option<PendingRequest> {
        self.current.lock().replace(request)
    }

    /// Removes and returns the request if it matches this device.
    pub(crate) fn take_matching(&self, device: &dyn SourceDevice) -> Option<PendingRequest> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|request| request.matches(device)) {
            current.take()
        } else {
            None
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.current.lock().is_none()
    }
}
