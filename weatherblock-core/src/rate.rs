use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// The request may proceed; `remaining` permits are left in the window.
    Allowed { remaining: u32 },
    /// The request must be rejected without touching the provider.
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_limited(&self) -> bool {
        matches!(self, RateDecision::Limited { .. })
    }
}

#[derive(Debug)]
struct WindowSlot {
    count: u32,
    window_ends: Instant,
}

/// Fixed-window request counter per client key.
///
/// Check and increment happen under one lock, so concurrent callers cannot
/// overshoot the limit. Checking never fails: absent state is a zero count.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window, slots: Mutex::new(HashMap::new()) }
    }

    /// Records one request attempt for `client_key` and decides its fate.
    ///
    /// Once a window is exhausted, further checks are rejected without
    /// incrementing, so abusive clients cannot grow the counter.
    pub fn check(&self, client_key: &str) -> RateDecision {
        let now = Instant::now();
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if !slots.contains_key(client_key) {
            // Drop elapsed windows before admitting a new client so the map
            // stays bounded by the set of currently active keys.
            slots.retain(|_, slot| slot.window_ends > now);
        }

        let slot = slots
            .entry(client_key.to_owned())
            .or_insert_with(|| WindowSlot { count: 0, window_ends: now + self.window });

        if slot.window_ends <= now {
            slot.count = 0;
            slot.window_ends = now + self.window;
        }

        if slot.count >= self.limit {
            return RateDecision::Limited { retry_after: slot.window_ends - now };
        }

        slot.count += 1;
        RateDecision::Allowed { remaining: self.limit - slot.count }
    }
}
