//! Authoritative world state

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::util::time::Timer;

use super::entity::{Bullet, Controller, EntityId, Player, Wall, PLAYER_SIZE};
use super::lobby::Lobby;
use super::physics::{Rect, GROUND_MAX, GROUND_MIN};

/// Static arena layout as (x, y, width, height)
pub const WALL_LAYOUT: [(f64, f64, f64, f64); 5] = [
    (0.0, 2.0, 200.0, 1000.0),
    (1000.0, 100.0, 200.0, 1000.0),
    (2000.0, 1000.0, 200.0, 1000.0),
    (-1000.0, -1000.0, 200.0, 1000.0),
    (-1500.0, 700.0, 200.0, 1000.0),
];

/// Ids stay below 2^53 so JavaScript clients read them exactly
const MAX_ENTITY_ID: u64 = 1 << 53;

/// The single mutable game state.
///
/// Created once at startup and owned by the arena task for the rest of the
/// process lifetime; there is no teardown beyond process exit.
pub struct World {
    pub players: HashMap<EntityId, Player>,
    pub bullets: HashMap<EntityId, Bullet>,
    pub walls: HashMap<EntityId, Wall>,
    pub lobby: Lobby,
    /// Every nickname that started a match, in order
    pub player_names: Vec<String>,
    pub rng: ChaCha8Rng,
    clock: Timer,
}

impl World {
    /// World with the standard wall layout
    pub fn new(rng: ChaCha8Rng) -> Self {
        let layout: Vec<Rect> = WALL_LAYOUT
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();
        Self::with_walls(rng, &layout)
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    pub fn with_walls(rng: ChaCha8Rng, layout: &[Rect]) -> Self {
        let mut world = Self {
            players: HashMap::new(),
            bullets: HashMap::new(),
            walls: HashMap::new(),
            lobby: Lobby::default(),
            player_names: Vec::new(),
            rng,
            clock: Timer::new(),
        };

        for rect in layout {
            let id = world.next_id();
            world.walls.insert(id, Wall { id, rect: *rect });
        }

        world
    }

    /// Draw a random id not used by any entity
    pub fn next_id(&mut self) -> EntityId {
        loop {
            let id = self.rng.gen_range(0..MAX_ENTITY_ID);
            if !self.players.contains_key(&id)
                && !self.bullets.contains_key(&id)
                && !self.walls.contains_key(&id)
            {
                return id;
            }
        }
    }

    /// Random player-sized rectangle inside the arena, clear of all walls
    fn spawn_rect(&mut self) -> Rect {
        loop {
            let rect = Rect {
                x: self.rng.gen_range(GROUND_MIN..GROUND_MAX - PLAYER_SIZE),
                y: self.rng.gen_range(GROUND_MIN..GROUND_MAX - PLAYER_SIZE),
                width: PLAYER_SIZE,
                height: PLAYER_SIZE,
                angle: self.rng.gen_range(0.0..std::f64::consts::TAU),
            };
            if !self.walls.values().any(|w| rect.overlaps(&w.rect)) {
                return rect;
            }
        }
    }

    pub fn spawn_player(&mut self, controller: Controller, nickname: String) -> EntityId {
        let id = self.next_id();
        let rect = self.spawn_rect();
        self.players
            .insert(id, Player::new(id, controller, nickname, rect));
        id
    }

    /// Remove a player together with every bullet it still owns
    pub fn remove_player(&mut self, id: EntityId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        for bullet_id in &player.bullets {
            self.bullets.remove(bullet_id);
        }
        Some(player)
    }

    /// Remove a bullet from the world and from its owner's set
    pub fn remove_bullet(&mut self, id: EntityId) -> Option<Bullet> {
        let bullet = self.bullets.remove(&id)?;
        if let Some(owner) = self.players.get_mut(&bullet.owner) {
            owner.bullets.remove(&id);
        }
        Some(bullet)
    }

    /// Fire a bullet from the player's centre along its facing.
    /// No-op while spectating or at the bullet cap.
    pub fn shoot(&mut self, player_id: EntityId) -> Option<EntityId> {
        let player = self.players.get(&player_id)?;
        if !player.can_fire() {
            return None;
        }

        let (x, y) = player.rect.center();
        let (angle, muzzle) = (player.rect.angle, player.rect.width / 2.0);

        let id = self.next_id();
        let mut bullet = Bullet::new(id, player_id, x, y, angle);
        // Starting inside a wall is allowed; the next tick discards it
        bullet
            .rect
            .attempt_move(muzzle, self.walls.values().map(|w| &w.rect));

        self.bullets.insert(id, bullet);
        if let Some(player) = self.players.get_mut(&player_id) {
            player.bullets.insert(id);
        }
        Some(id)
    }

    /// Whole seconds since the world was created
    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }
}
