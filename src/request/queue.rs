// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered store of independently matched requests.

use parking_lot::Mutex;

use crate::request::PendingRequest;
use crate::source::SourceDevice;

/// Pending requests in registration order. Any number may be
/// outstanding; each is removed on its own match.
#[derive(Debug, Default)]
pub(crate) struct RequestQueue {
    requests: Mutex<Vec<PendingRequest>>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, request: PendingRequest) {
        self.requests.lock().push(request);
    }

    /// Removes and returns every request this device report matches,
    /// preserving registration order. Unmatched requests stay queued.
    pub(crate) fn drain_matching(&self, device: &dyn SourceDevice) -> Vec<PendingRequest> {
        let mut requests = self.requests.lock();
        requests
            .extract_if(.., |request| request.matches(device))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestAction;
    use crate::source::SimulatedDevice;

    fn request(target: &str) -> PendingRequest {
        PendingRequest::new(target, RequestAction::RelayState(Box::new(|_| {})))
    }

    #[test]
    fn drains_only_matching_requests() {
        let queue = RequestQueue::new();
        queue.push(request("dev-1"));
        queue.push(request("dev-2"));
        queue.push(request("dev-1"));

        let device = SimulatedDevice::relay("dev-1");
        let matched = queue.drain_matching(&device);

        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|r| r.target() == "dev-1"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn preserves_registration_order() {
        let queue = RequestQueue::new();
        let first = request("dev-1");
        let second = request("dev-1");
        let first_id = first.id();
        let second_id = second.id();
        queue.push(first);
        queue.push(second);

        let device = SimulatedDevice::relay("dev-1");
        let matched = queue.drain_matching(&device);
        assert_eq!(matched[0].id(), first_id);
        assert_eq!(matched[1].id(), second_id);
    }

    #[test]
    fn no_match_leaves_queue_untouched() {
        let queue = RequestQueue::new();
        queue.push(request("dev-1"));

        let other = SimulatedDevice::relay("dev-9");
        assert!(queue.drain_matching(&other).is_empty());
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }
}
