//! Walls, bullets and players

use std::collections::HashSet;

use crate::ws::protocol::{ConnectionId, Movement};

use super::physics::Rect;

/// Entity identifier, unique across all collections of a world
pub type EntityId = u64;

pub const PLAYER_SIZE: f64 = 80.0;
pub const MAX_HEALTH: i32 = 10;
pub const BULLET_SIZE: f64 = 15.0;
/// Live bullets a single player may own at once
pub const MAX_BULLETS_PER_PLAYER: usize = 5;
/// Reaching exactly one of these scores restores full health
pub const HEALTH_MILESTONES: [u32; 3] = [20, 50, 100];

/// Static obstacle, immutable after world creation
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: EntityId,
    pub rect: Rect,
}

/// Projectile owned by the player that fired it
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub rect: Rect,
    /// Firing player, used only to maintain its bullet set
    pub owner: EntityId,
}

impl Bullet {
    pub fn new(id: EntityId, owner: EntityId, x: f64, y: f64, angle: f64) -> Self {
        Self {
            id,
            rect: Rect {
                x,
                y,
                width: BULLET_SIZE,
                height: BULLET_SIZE,
                angle,
            },
            owner,
        }
    }
}

/// Who drives a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// Driven by intents from a live connection
    Human { connection_id: ConnectionId },
    /// Driven by its own wander timer
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub rect: Rect,
    pub controller: Controller,
    pub nickname: String,
    pub health: i32,
    pub max_health: i32,
    /// Cumulative score
    pub point: u32,
    pub movement: Movement,
    pub spectating: bool,
    pub bullets: HashSet<EntityId>,
}

impl Player {
    pub fn new(id: EntityId, controller: Controller, nickname: String, rect: Rect) -> Self {
        Self {
            id,
            rect,
            controller,
            nickname,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            point: 0,
            movement: Movement::default(),
            spectating: false,
            bullets: HashSet::new(),
        }
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        match self.controller {
            Controller::Human { connection_id } => Some(connection_id),
            Controller::Bot => None,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.controller == Controller::Bot
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether the player may currently move or fire
    pub fn accepts_intents(&self) -> bool {
        self.is_alive() && !self.spectating
    }

    pub fn can_fire(&self) -> bool {
        !self.spectating && self.bullets.len() < MAX_BULLETS_PER_PLAYER
    }

    /// Restore full health if the score sits on a milestone.
    /// Returns true if the milestone matched.
    pub fn restore_health_at_milestone(&mut self) -> bool {
        if HEALTH_MILESTONES.contains(&self.point) {
            self.health = self.max_health;
            return true;
        }
        false
    }
}
