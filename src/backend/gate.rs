//! Per-endpoint single-flight bookkeeping.
//!
//! Every request gets a fresh id. The gate remembers the id currently in flight for each
//! endpoint; a completion whose id does not match is stale and must be dropped.

use crate::backend::Endpoint;
use crate::render::protocol::RequestId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RequestGate {
    next_id: RequestId,
    in_flight: HashMap<Endpoint, RequestId>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the endpoint. Returns None when a request is already in flight.
    pub fn begin(&mut self, endpoint: Endpoint) -> Option<RequestId> {
        if self.in_flight.contains_key(&endpoint) {
            return None;
        }
        Some(self.issue(endpoint))
    }

    /// Claim the endpoint unconditionally; any in-flight request becomes stale.
    pub fn supersede(&mut self, endpoint: Endpoint) -> RequestId {
        if let Some(stale) = self.in_flight.get(&endpoint) {
            log::debug!("{} request {} superseded", endpoint, stale);
        }
        self.issue(endpoint)
    }

    /// Release the endpoint if `request_id` is the current request. Returns false for stale ids.
    pub fn finish(&mut self, endpoint: Endpoint, request_id: RequestId) -> bool {
        match self.in_flight.get(&endpoint) {
            Some(&current) if current == request_id => {
                self.in_flight.remove(&endpoint);
                true
            }
            _ => false,
        }
    }

    /// True while `request_id` is the endpoint's current request.
    pub fn is_current(&self, endpoint: Endpoint, request_id: RequestId) -> bool {
        self.in_flight.get(&endpoint) == Some(&request_id)
    }

    pub fn is_in_flight(&self, endpoint: Endpoint) -> bool {
        self.in_flight.contains_key(&endpoint)
    }

    /// Forget the in-flight request so its completion is treated as stale.
    pub fn cancel(&mut self, endpoint: Endpoint) -> Option<RequestId> {
        self.in_flight.remove(&endpoint)
    }

    fn issue(&mut self, endpoint: Endpoint) -> RequestId {
        self.next_id += 1;
        let request_id = self.next_id;
        self.in_flight.insert(endpoint, request_id);
        request_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_finish() {
        let mut gate = RequestGate::new();
        let first = gate.begin(Endpoint::Ask).unwrap();
        assert_eq!(gate.begin(Endpoint::Ask), None);

        assert!(gate.finish(Endpoint::Ask, first));
        assert!(gate.begin(Endpoint::Ask).is_some());
    }

    #[test]
    fn endpoints_are_independent() {
        let mut gate = RequestGate::new();
        assert!(gate.begin(Endpoint::Ask).is_some());
        assert!(gate.begin(Endpoint::Upload).is_some());
        assert!(gate.is_in_flight(Endpoint::Ask));
        assert!(!gate.is_in_flight(Endpoint::Progress));
    }

    #[test]
    fn superseded_responses_are_stale() {
        let mut gate = RequestGate::new();
        let old = gate.supersede(Endpoint::SlideTexts);
        let new = gate.supersede(Endpoint::SlideTexts);
        assert_ne!(old, new);

        assert!(!gate.finish(Endpoint::SlideTexts, old));
        assert!(gate.is_current(Endpoint::SlideTexts, new));
        assert!(gate.finish(Endpoint::SlideTexts, new));
        assert!(!gate.is_in_flight(Endpoint::SlideTexts));
    }

    #[test]
    fn cancelled_requests_cannot_finish() {
        let mut gate = RequestGate::new();
        let id = gate.begin(Endpoint::Progress).unwrap();
        assert_eq!(gate.cancel(Endpoint::Progress), Some(id));
        assert!(!gate.finish(Endpoint::Progress, id));
    }
}
