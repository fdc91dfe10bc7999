//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{Arena, ArenaHandle, World};
use crate::ws::hub::ConnectionHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hub: Arc<ConnectionHub>,
    pub arena: ArenaHandle,
}

impl AppState {
    /// Build the state together with the arena task that still has to be spawned
    pub fn new(config: Config) -> (Self, Arena) {
        let config = Arc::new(config);

        // Initialize connection registry
        let hub = Arc::new(ConnectionHub::new());

        // Initialize the world and its owning arena
        let (arena, handle) = Arena::new(World::from_entropy(), hub.clone());

        let state = Self {
            config,
            hub,
            arena: handle,
        };

        (state, arena)
    }
}
