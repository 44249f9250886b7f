//! Battle worker that owns the authoritative [`BattleEngine`].
//!
//! Receives commands from [`crate::BattleHandle`], completions from running
//! Actor Actions, and a periodic tick that drives monster pacing and the
//! action watchdog.

use std::time::Duration;

use battle_core::{
    ActionTicket, BattleEngine, BattleSnapshot, BattlerId, CommandError, TargetSelection,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<Result<T, CommandError>>;

/// Player actions that dispatch an Actor Action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackKind {
    Normal,
    Strong,
    Skill,
}

/// Commands that can be sent to the battle worker
pub enum Command {
    Start {
        reply: oneshot::Sender<()>,
    },
    SelectTarget {
        actor: BattlerId,
        target: BattlerId,
        reply: Reply<TargetSelection>,
    },
    Attack {
        actor: BattlerId,
        kind: AttackKind,
        reply: Reply<ActionTicket>,
    },
    EndTurn {
        actor: BattlerId,
        reply: Reply<()>,
    },
    /// Completion reported by an external actor that is not run by the
    /// runtime's own dispatcher.
    CompleteAction {
        ticket: ActionTicket,
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<BattleSnapshot>,
    },
}

/// Background task that processes battle commands.
pub struct BattleWorker {
    engine: BattleEngine,
    command_rx: mpsc::Receiver<Command>,
    completion_rx: mpsc::Receiver<ActionTicket>,
    poll_interval: Duration,
}

impl BattleWorker {
    pub fn new(
        engine: BattleEngine,
        command_rx: mpsc::Receiver<Command>,
        completion_rx: mpsc::Receiver<ActionTicket>,
        poll_interval: Duration,
    ) -> Self {
        info!(
            target: "runtime::worker",
            battlers = engine.registry().len(),
            poll_ms = poll_interval.as_millis() as u64,
            "battle worker initialized",
        );
        Self {
            engine,
            command_rx,
            completion_rx,
            poll_interval,
        }
    }

    /// Main worker loop. Ends when every command sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(ticket) = self.completion_rx.recv() => self.handle_completion(ticket),
                _ = ticker.tick() => self.engine.poll(),
            }
        }
        debug!(target: "runtime::worker", "command channel closed; worker exiting");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                self.engine.start();
                if reply.send(()).is_err() {
                    debug!(target: "runtime::worker", "Start reply channel closed (caller dropped)");
                }
            }
            Command::SelectTarget {
                actor,
                target,
                reply,
            } => {
                let result = self
                    .engine
                    .ensure_current_turn(actor)
                    .and_then(|()| self.engine.select_target(target));
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "SelectTarget reply channel closed (caller dropped)");
                }
            }
            Command::Attack { actor, kind, reply } => {
                let result = self.engine.ensure_current_turn(actor).and_then(|()| match kind {
                    AttackKind::Normal => self.engine.issue_normal_attack(),
                    AttackKind::Strong => self.engine.issue_strong_attack(),
                    AttackKind::Skill => self.engine.issue_skill(),
                });
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Attack reply channel closed (caller dropped)");
                }
            }
            Command::EndTurn { actor, reply } => {
                let result = self
                    .engine
                    .ensure_current_turn(actor)
                    .and_then(|()| self.engine.issue_end_turn());
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "EndTurn reply channel closed (caller dropped)");
                }
            }
            Command::CompleteAction { ticket, reply } => {
                let result = self.engine.complete_action(ticket);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "CompleteAction reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.engine.snapshot()).is_err() {
                    debug!(target: "runtime::worker", "Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_completion(&mut self, ticket: ActionTicket) {
        // UnknownTicket here means the watchdog already force-completed it
        if let Err(err) = self.engine.complete_action(ticket) {
            debug!(target: "runtime::worker", %ticket, %err, "late completion ignored");
        }
    }
}
