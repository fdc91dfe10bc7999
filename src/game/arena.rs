//! Arena task: the single owner of the world and its authoritative tick loop

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::util::time::TICK_DURATION;
use crate::ws::hub::Transport;
use crate::ws::protocol::{ClientMsg, ConnectionId, ServerMsg};

use super::bot::{step_bot, BotController, BOT_NICKNAME};
use super::combat::Elimination;
use super::entity::{Controller, EntityId};
use super::session::Session;
use super::tick::run_tick;
use super::world::World;

/// Queued commands before senders wait
const COMMAND_BUFFER: usize = 1024;

/// Everything that may mutate the world, applied one at a time
#[derive(Debug)]
pub enum ArenaCommand {
    Connect { connection_id: ConnectionId },
    Intent { connection_id: ConnectionId, msg: ClientMsg },
    Disconnect { connection_id: ConnectionId },
    BotStep { bot_id: EntityId },
    RespawnBot { nickname: String },
}

/// Handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    commands: mpsc::Sender<ArenaCommand>,
    player_count: Arc<AtomicUsize>,
}

impl ArenaHandle {
    pub async fn connect(&self, connection_id: ConnectionId) {
        self.send(ArenaCommand::Connect { connection_id }).await;
    }

    pub async fn intent(&self, connection_id: ConnectionId, msg: ClientMsg) {
        self.send(ArenaCommand::Intent { connection_id, msg }).await;
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) {
        self.send(ArenaCommand::Disconnect { connection_id }).await;
    }

    /// Players in the world as of the last tick
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    async fn send(&self, command: ArenaCommand) {
        if self.commands.send(command).await.is_err() {
            warn!("Arena task has stopped, dropping command");
        }
    }
}

/// The authoritative arena
pub struct Arena {
    world: World,
    sessions: HashMap<ConnectionId, Session>,
    bots: BotController,
    transport: Arc<dyn Transport>,
    commands: mpsc::Receiver<ArenaCommand>,
    player_count: Arc<AtomicUsize>,
}

impl Arena {
    pub fn new(world: World, transport: Arc<dyn Transport>) -> (Self, ArenaHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = ArenaHandle {
            commands: command_tx.clone(),
            player_count: player_count.clone(),
        };

        let arena = Self {
            world,
            sessions: HashMap::new(),
            bots: BotController::new(command_tx),
            transport,
            commands: command_rx,
            player_count,
        };

        (arena, handle)
    }

    /// Run the tick loop for the lifetime of the process.
    ///
    /// Commands and ticks are handled strictly one after another, which is
    /// what keeps every mutation atomic with respect to the snapshot.
    pub async fn run(mut self) {
        info!(walls = self.world.walls.len(), "Arena started");
        self.spawn_bot(BOT_NICKNAME.to_string());

        let mut tick_interval = interval(TICK_DURATION);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => self.tick(),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }
        }

        info!("Arena stopped");
    }

    fn handle_command(&mut self, command: ArenaCommand) {
        match command {
            ArenaCommand::Connect { connection_id } => {
                self.sessions
                    .insert(connection_id, Session::new(connection_id));
                info!(connection_id = %connection_id, sessions = self.sessions.len(), "Connection opened");
                self.transport
                    .emit_all(&ServerMsg::UpdatedUserlist(self.transport.connection_count()));
            }
            ArenaCommand::Intent { connection_id, msg } => {
                match self.sessions.get_mut(&connection_id) {
                    Some(session) => session.handle(msg, &mut self.world, self.transport.as_ref()),
                    None => debug!(connection_id = %connection_id, "Intent for unknown session"),
                }
            }
            ArenaCommand::Disconnect { connection_id } => {
                match self.sessions.remove(&connection_id) {
                    Some(mut session) => {
                        session.disconnect(&mut self.world, self.transport.as_ref());
                        info!(connection_id = %connection_id, "Connection closed");
                    }
                    None => debug!(connection_id = %connection_id, "Disconnect for unknown session"),
                }
            }
            ArenaCommand::BotStep { bot_id } => {
                // Steps queued before a bot's elimination land here as no-ops
                step_bot(&mut self.world, bot_id);
            }
            ArenaCommand::RespawnBot { nickname } => {
                self.spawn_bot(nickname);
            }
        }
    }

    fn tick(&mut self) {
        let report = run_tick(&mut self.world, self.transport.as_ref());
        self.handle_eliminations(report.eliminations);
        self.player_count
            .store(self.world.players.len(), Ordering::Relaxed);
    }

    fn handle_eliminations(&mut self, eliminations: Vec<Elimination>) {
        for elimination in eliminations.into_iter().filter(|e| e.was_bot) {
            // Cancel before scheduling so the dead bot never acts again
            self.bots.cancel(elimination.player_id);
            self.bots.schedule_respawn(elimination.nickname);
        }
    }

    fn spawn_bot(&mut self, nickname: String) -> EntityId {
        let bot_id = self.world.spawn_player(Controller::Bot, nickname.clone());
        self.bots.start(bot_id);
        info!(player_id = bot_id, nickname = %nickname, "Bot spawned");
        bot_id
    }
}
