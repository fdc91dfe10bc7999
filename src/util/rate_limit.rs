//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Max inbound frames per second per connection
pub const INPUT_RATE_LIMIT: u32 = 120;

/// Max chat messages per second per connection
pub const CHAT_RATE_LIMIT: u32 = 3;

/// Per-connection rate limiter state
pub struct ConnectionRateLimiter {
    input_limiter: Arc<Limiter>,
    chat_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new() -> Self {
        Self {
            input_limiter: create_limiter(INPUT_RATE_LIMIT),
            chat_limiter: create_limiter(CHAT_RATE_LIMIT),
        }
    }

    /// Check if an inbound frame is allowed (returns true if allowed)
    pub fn check_input(&self) -> bool {
        self.input_limiter.check().is_ok()
    }

    /// Check if a chat message is allowed (returns true if allowed)
    pub fn check_chat(&self) -> bool {
        self.chat_limiter.check().is_ok()
    }
}

impl Default for ConnectionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_burst_is_capped() {
        let limiter = ConnectionRateLimiter::new();
        let allowed = (0..10).filter(|_| limiter.check_chat()).count();
        assert_eq!(allowed, CHAT_RATE_LIMIT as usize);
        assert!(limiter.check_input());
    }
}
