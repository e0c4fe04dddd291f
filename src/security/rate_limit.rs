//! Per-session flood control (spec §4.C: "consume one token from the rate
//! limiter... if empty, the line is either dropped... or the session is
//! flagged for disconnect after a threshold").
//!
//! Uses `governor`'s token bucket, one limiter per registered session.

use crate::config::RateLimitConfig;
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;

type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// A single client's message token bucket, plus a running count of drops
/// used to decide when a flood crosses from "drop the line" to "disconnect".
pub struct RateLimiter {
    limiter: DirectRateLimiter,
    consecutive_drops: u32,
}

/// After this many consecutive rate-limited lines, the session is
/// disconnected instead of having further lines silently dropped.
const DISCONNECT_THRESHOLD: u32 = 20;

impl RateLimiter {
    /// Build a limiter from the configured rate and burst.
    pub fn new(config: &RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.messages_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::new(1).unwrap());
        Self {
            limiter: GovRateLimiter::direct(Quota::per_second(rate).allow_burst(burst)),
            consecutive_drops: 0,
        }
    }

    /// Consume a token for one incoming line.
    pub fn check(&mut self) -> RateDecision {
        if self.limiter.check().is_ok() {
            self.consecutive_drops = 0;
            RateDecision::Allow
        } else {
            self.consecutive_drops += 1;
            if self.consecutive_drops >= DISCONNECT_THRESHOLD {
                RateDecision::Disconnect
            } else {
                RateDecision::Drop
            }
        }
    }
}

/// What to do with the line that triggered a rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Process the line normally.
    Allow,
    /// Silently discard the line and continue the session.
    Drop,
    /// Too many consecutive drops; tear the session down.
    Disconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RateLimitConfig {
        RateLimitConfig {
            messages_per_second: 2,
            burst: 2,
        }
    }

    #[test]
    fn allows_up_to_burst_then_drops() {
        let mut limiter = RateLimiter::new(&config());
        assert_eq!(limiter.check(), RateDecision::Allow);
        assert_eq!(limiter.check(), RateDecision::Allow);
        assert_eq!(limiter.check(), RateDecision::Drop);
    }

    #[test]
    fn escalates_to_disconnect_after_sustained_flood() {
        let mut limiter = RateLimiter::new(&RateLimitConfig {
            messages_per_second: 1,
            burst: 1,
        });
        assert_eq!(limiter.check(), RateDecision::Allow);
        let mut last = RateDecision::Allow;
        for _ in 0..DISCONNECT_THRESHOLD {
            last = limiter.check();
        }
        assert_eq!(last, RateDecision::Disconnect);
    }
}
