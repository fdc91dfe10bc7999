//! Scripted participant and its timers

use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::debug;

use crate::util::time::{BOT_RESPAWN_DELAY, BOT_STEP_DURATION};

use super::arena::ArenaCommand;
use super::entity::EntityId;
use super::world::World;

pub const BOT_NICKNAME: &str = "Karthick";
/// Distance a bot wanders per step
pub const BOT_SPEED: f64 = 4.0;
/// Chance to fire on any given step
pub const BOT_FIRE_CHANCE: f64 = 0.03;

/// One wander step: move forward, pick a new random heading when blocked,
/// occasionally fire. Returns false if the bot is no longer in the world.
pub fn step_bot(world: &mut World, bot_id: EntityId) -> bool {
    let walls = &world.walls;
    let Some(bot) = world.players.get_mut(&bot_id).filter(|p| p.is_bot()) else {
        return false;
    };

    if !bot
        .rect
        .attempt_move(BOT_SPEED, walls.values().map(|w| &w.rect))
    {
        bot.rect.angle = world.rng.gen_range(0.0..std::f64::consts::TAU);
    }

    if world.rng.gen_bool(BOT_FIRE_CHANCE) {
        world.shoot(bot_id);
    }

    true
}

/// Owns the wander timer of every live bot.
///
/// Timers never touch the world; they only enqueue commands for the arena
/// task, which applies them under the same ordering as client intents.
pub struct BotController {
    timers: HashMap<EntityId, JoinHandle<()>>,
    commands: mpsc::Sender<ArenaCommand>,
}

impl BotController {
    pub fn new(commands: mpsc::Sender<ArenaCommand>) -> Self {
        Self {
            timers: HashMap::new(),
            commands,
        }
    }

    /// Start the recurring wander timer for a freshly spawned bot
    pub fn start(&mut self, bot_id: EntityId) {
        let commands = self.commands.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(BOT_STEP_DURATION);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately; the first step comes one period later
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if commands.send(ArenaCommand::BotStep { bot_id }).await.is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = self.timers.insert(bot_id, handle) {
            previous.abort();
        }
    }

    /// Stop a bot's timer. Returns false if it had none.
    pub fn cancel(&mut self, bot_id: EntityId) -> bool {
        match self.timers.remove(&bot_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Queue a replacement bot after the respawn delay
    pub fn schedule_respawn(&self, nickname: String) {
        let commands = self.commands.clone();
        debug!(nickname = %nickname, delay_ms = BOT_RESPAWN_DELAY.as_millis() as u64, "Scheduling bot respawn");
        tokio::spawn(async move {
            sleep(BOT_RESPAWN_DELAY).await;
            if commands.send(ArenaCommand::RespawnBot { nickname }).await.is_err() {
                debug!("Arena task has stopped, dropping bot respawn");
            }
        });
    }

    #[cfg(test)]
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}
