//! One fixed-period simulation step

use crate::ws::hub::Transport;

use super::combat::{self, Elimination};
use super::snapshot;
use super::world::World;

/// Distance a player moves per tick while a direction is held
pub const PLAYER_SPEED: f64 = 20.0;
/// Radians turned per tick while left or right is held
pub const TURN_RATE: f64 = 0.05;

/// What the caller has to act on after a tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub eliminations: Vec<Elimination>,
}

/// Advance the world one tick and broadcast the resulting state.
///
/// Runs to completion without yielding, so no intent can observe or modify
/// the world half-way through.
pub fn run_tick(world: &mut World, transport: &dyn Transport) -> TickReport {
    update_movement(world);
    let eliminations = combat::update_bullets(world, transport);

    for msg in snapshot::build(world) {
        transport.emit_all(&msg);
    }

    TickReport { eliminations }
}

/// Apply every player's held directions.
///
/// Forward then back are applied as separate bounded moves, so holding both
/// nets roughly zero displacement.
pub fn update_movement(world: &mut World) {
    let walls = &world.walls;
    for player in world.players.values_mut() {
        if !player.is_alive() || player.movement.is_idle() {
            continue;
        }

        let movement = player.movement;
        if movement.forward {
            player
                .rect
                .attempt_move(PLAYER_SPEED, walls.values().map(|w| &w.rect));
        }
        if movement.back {
            player
                .rect
                .attempt_move(-PLAYER_SPEED, walls.values().map(|w| &w.rect));
        }
        if movement.left {
            player.rect.angle -= TURN_RATE;
        }
        if movement.right {
            player.rect.angle += TURN_RATE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{Controller, PLAYER_SIZE};
    use crate::game::physics::Rect;
    use crate::game::world::tests::{open_arena, seeded};
    use crate::ws::hub::testing::{Audience, RecordingTransport};
    use crate::ws::protocol::{Movement, ServerMsg};
    use uuid::Uuid;

    #[test]
    fn forward_moves_along_heading() {
        let mut world = open_arena(1);
        let id = world.spawn_player(Controller::Bot, "p".into());
        {
            let p = world.players.get_mut(&id).unwrap();
            p.rect = Rect::new(0.0, 0.0, PLAYER_SIZE, PLAYER_SIZE);
            p.movement = Movement {
                forward: true,
                ..Movement::default()
            };
        }

        update_movement(&mut world);

        let rect = world.players[&id].rect;
        assert!((rect.x - 20.0).abs() < 1e-9);
        assert!(rect.y.abs() < 1e-9);
    }

    #[test]
    fn forward_and_back_cancel_and_turns_accumulate() {
        let mut world = open_arena(1);
        let id = world.spawn_player(Controller::Bot, "p".into());
        {
            let p = world.players.get_mut(&id).unwrap();
            p.rect = Rect::new(100.0, 100.0, PLAYER_SIZE, PLAYER_SIZE);
            p.movement = Movement {
                forward: true,
                back: true,
                left: true,
                right: false,
            };
        }

        update_movement(&mut world);
        update_movement(&mut world);

        let rect = world.players[&id].rect;
        assert!((rect.x - 100.0).abs() < 1e-9);
        assert!((rect.y - 100.0).abs() < 1e-9);
        assert!((rect.angle + 2.0 * TURN_RATE).abs() < 1e-9);
    }

    #[test]
    fn movement_stops_at_walls() {
        let mut world = seeded(1);
        let id = world.spawn_player(Controller::Bot, "p".into());
        {
            let p = world.players.get_mut(&id).unwrap();
            // Facing the wall at (0, 2) from its left side
            p.rect = Rect::new(-100.0, 100.0, PLAYER_SIZE, PLAYER_SIZE);
            p.movement = Movement {
                forward: true,
                ..Movement::default()
            };
        }

        for _ in 0..10 {
            update_movement(&mut world);
        }

        let rect = world.players[&id].rect;
        assert!((rect.x + 100.0).abs() < 1e-9);
        assert!(!world.walls.values().any(|w| rect.overlaps(&w.rect)));
    }

    #[test]
    fn tick_broadcasts_state_then_timer() {
        let mut world = seeded(1);
        let transport = RecordingTransport::default();
        world.spawn_player(Controller::Bot, "p".into());

        run_tick(&mut world, &transport);

        let sent = transport.take();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], (Audience::All, ServerMsg::State(s)) if s.players.len() == 1));
        assert_eq!(sent[1], (Audience::All, ServerMsg::MatchTimer(0)));
    }

    #[test]
    fn eliminated_player_is_absent_from_same_tick_snapshot() {
        let mut world = open_arena(1);
        let transport = RecordingTransport::default();
        let connection_id = Uuid::new_v4();
        let firer = world.spawn_player(Controller::Bot, "bot".into());
        let victim = world.spawn_player(Controller::Human { connection_id }, "ann".into());
        world.players.get_mut(&firer).unwrap().rect = Rect::new(0.0, 0.0, PLAYER_SIZE, PLAYER_SIZE);
        {
            let v = world.players.get_mut(&victim).unwrap();
            v.rect = Rect::new(200.0, 0.0, PLAYER_SIZE, PLAYER_SIZE);
            v.health = 1;
        }
        world.shoot(firer);
        // Bullet starts at x=80 and closes 50 units per tick
        let mut report = TickReport::default();
        for _ in 0..3 {
            report = run_tick(&mut world, &transport);
            if !report.eliminations.is_empty() {
                break;
            }
        }

        assert_eq!(report.eliminations.len(), 1);
        let last_state = transport
            .take()
            .into_iter()
            .filter_map(|(_, msg)| match msg {
                ServerMsg::State(s) => Some(s),
                _ => None,
            })
            .last()
            .unwrap();
        assert!(!last_state.players.contains_key(&victim));
        assert!(last_state.players.contains_key(&firer));
    }
}
