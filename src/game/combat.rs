//! Bullet flight, hit detection and damage

use tracing::info;

use crate::ws::hub::Transport;
use crate::ws::protocol::ServerMsg;

use super::entity::EntityId;
use super::world::World;

/// Distance a bullet travels per tick
pub const BULLET_SPEED: f64 = 50.0;

/// A player removed from the world because its health ran out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    pub player_id: EntityId,
    pub nickname: String,
    pub was_bot: bool,
}

/// Advance every bullet and resolve at most one hit per bullet.
///
/// A bullet that cannot move (left the arena or struck a wall) is removed
/// without being tested against players.
pub fn update_bullets(world: &mut World, transport: &dyn Transport) -> Vec<Elimination> {
    let mut eliminations = Vec::new();
    let bullet_ids: Vec<EntityId> = world.bullets.keys().copied().collect();

    for bullet_id in bullet_ids {
        // Removed earlier this tick together with its eliminated owner
        let Some(bullet) = world.bullets.get_mut(&bullet_id) else {
            continue;
        };

        if !bullet
            .rect
            .attempt_move(BULLET_SPEED, world.walls.values().map(|w| &w.rect))
        {
            world.remove_bullet(bullet_id);
            continue;
        }

        let (rect, owner) = (bullet.rect, bullet.owner);
        let target = world
            .players
            .values()
            .find(|p| p.id != owner && !p.spectating && p.rect.overlaps(&rect))
            .map(|p| p.id);

        if let Some(target_id) = target {
            if let Some(elimination) = apply_damage(world, target_id, transport) {
                eliminations.push(elimination);
            }
            credit_hit(world, owner);
            world.remove_bullet(bullet_id);
        }
    }

    eliminations
}

/// Take one health point; at zero the player leaves the world immediately
pub fn apply_damage(world: &mut World, target_id: EntityId, transport: &dyn Transport) -> Option<Elimination> {
    let target = world.players.get_mut(&target_id)?;
    if target.spectating {
        return None;
    }

    target.health -= 1;
    if target.is_alive() {
        return None;
    }

    if let Some(connection_id) = target.connection_id() {
        transport.emit_to(connection_id, &ServerMsg::Dead);
    }

    let player = world.remove_player(target_id)?;
    info!(player_id = target_id, nickname = %player.nickname, "Player eliminated");
    transport.emit_all(&ServerMsg::UpdatedPlayerList(player.nickname.clone()));

    Some(Elimination {
        player_id: target_id,
        was_bot: player.is_bot(),
        nickname: player.nickname,
    })
}

/// Score a hit for the firer and apply milestone health restoration
fn credit_hit(world: &mut World, firer_id: EntityId) {
    if let Some(firer) = world.players.get_mut(&firer_id) {
        firer.point += 1;
        firer.restore_health_at_milestone();
    }
}
