//! Game simulation modules

pub mod arena;
pub mod bot;
pub mod combat;
pub mod entity;
pub mod lobby;
pub mod physics;
pub mod session;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use arena::{Arena, ArenaHandle};
pub use entity::EntityId;
pub use world::World;
