//! Time utilities for game simulation

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 20; // 20 ticks per second
pub const TICK_DURATION: Duration = Duration::from_millis(1000 / SIMULATION_TPS as u64);

/// Bot wander timer runs at the simulation rate but on its own schedule
pub const BOT_STEP_DURATION: Duration = TICK_DURATION;

/// Delay between a bot's elimination and its replacement
pub const BOT_RESPAWN_DELAY: Duration = Duration::from_millis(3000);

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
