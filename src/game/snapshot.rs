//! Snapshot building for network transmission

use crate::ws::protocol::{BulletView, PlayerView, ServerMsg, WallView, WorldSnapshot};

use super::entity::{Bullet, Player, Wall};
use super::world::World;

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            rect: p.rect,
            socket_id: p.connection_id(),
            nickname: p.nickname.clone(),
            health: p.health,
            max_health: p.max_health,
            point: p.point,
            spectating: p.spectating,
        }
    }
}

impl From<&Bullet> for BulletView {
    fn from(b: &Bullet) -> Self {
        Self {
            id: b.id,
            rect: b.rect,
            player_id: b.owner,
        }
    }
}

impl From<&Wall> for WallView {
    fn from(w: &Wall) -> Self {
        Self { id: w.id, rect: w.rect }
    }
}

/// Capture every entity collection in its public form
pub fn capture(world: &World) -> WorldSnapshot {
    WorldSnapshot {
        players: world.players.iter().map(|(id, p)| (*id, p.into())).collect(),
        bullets: world.bullets.iter().map(|(id, b)| (*id, b.into())).collect(),
        walls: world.walls.iter().map(|(id, w)| (*id, w.into())).collect(),
    }
}

/// The per-tick broadcast: full state followed by the match timer
pub fn build(world: &World) -> [ServerMsg; 2] {
    [
        ServerMsg::State(capture(world)),
        ServerMsg::MatchTimer(world.elapsed_secs()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Controller;
    use crate::game::world::tests::seeded;
    use uuid::Uuid;

    #[test]
    fn captures_every_collection_by_id() {
        let mut world = seeded(9);
        let connection_id = Uuid::new_v4();
        let human = world.spawn_player(Controller::Human { connection_id }, "ann".into());
        let bot = world.spawn_player(Controller::Bot, "bot".into());
        let bullet = world.shoot(human).unwrap();

        let snapshot = capture(&world);

        assert_eq!(snapshot.walls.len(), world.walls.len());
        assert_eq!(snapshot.players[&human].socket_id, Some(connection_id));
        assert_eq!(snapshot.players[&bot].socket_id, None);
        assert_eq!(snapshot.bullets[&bullet].player_id, human);
        assert_eq!(snapshot.players[&human].rect, world.players[&human].rect);
    }

    #[test]
    fn timer_starts_at_zero() {
        let world = seeded(9);
        let [state, timer] = build(&world);
        assert!(matches!(state, ServerMsg::State(_)));
        assert_eq!(timer, ServerMsg::MatchTimer(0));
    }
}
