use std::time::{Duration, Instant};

/// Pacing and health state for a single domain
///
/// Each domain's state is independent: request slots, identity rotation and
/// the circuit breaker for one domain never block another. State lives for
/// one run and is never persisted.
#[derive(Debug, Clone)]
pub struct DomainPacing {
    /// Earliest instant the next request may start
    next_slot: Option<Instant>,

    /// Requests issued to this domain so far
    pub request_count: u32,

    /// Failures since the last success; resets on success
    pub consecutive_failures: u32,

    /// Whether the circuit breaker has opened for this domain
    pub tripped: bool,

    /// Index into the shared user-agent pool
    pub identity_index: usize,
}

impl DomainPacing {
    pub fn new() -> Self {
        Self {
            next_slot: None,
            request_count: 0,
            consecutive_failures: 0,
            tripped: false,
            identity_index: 0,
        }
    }

    /// Reserves the next request slot and returns how long the caller must
    /// wait before issuing the request
    ///
    /// `gap` is the randomized delay to schedule after this request. Slots
    /// are handed out in order even under concurrent callers, because the
    /// reservation happens while the controller holds the domain map lock.
    pub fn reserve(&mut self, gap: Duration, now: Instant) -> Duration {
        let start = match self.next_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        self.next_slot = Some(start + gap);
        start.saturating_duration_since(now)
    }

    /// Counts a request and reports whether the identity should rotate
    ///
    /// Rotation happens on every `rotate_after`-th request to this domain.
    pub fn count_request(&mut self, rotate_after: u32) -> bool {
        self.request_count += 1;
        if self.request_count % rotate_after == 0 {
            self.identity_index += 1;
            true
        } else {
            false
        }
    }

    /// Clears the failure streak after a successful fetch
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Counts a failed fetch; returns true if the breaker tripped just now
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.consecutive_failures += 1;
        if !self.tripped && self.consecutive_failures >= threshold {
            self.tripped = true;
            return true;
        }
        false
    }

    /// Advances to the next identity immediately (block signal seen)
    pub fn rotate_identity(&mut self) {
        self.identity_index += 1;
    }
}

impl Default for DomainPacing {
    fn default() -> Self {
        Self::new()
    }
}
