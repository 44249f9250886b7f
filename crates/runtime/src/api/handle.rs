//! Cloneable façade for issuing commands to the battle worker.
//!
//! Every player command names the acting battler; the worker rejects it with
//! [`CommandError::NotCurrentTurn`](battle_core::CommandError::NotCurrentTurn)
//! unless it is that battler's turn.
use std::collections::HashMap;

use battle_core::{
    ActionTicket, BattleEvent, BattleSnapshot, BattlerId, CommandError, TargetSelection,
};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use super::providers::PlayerCommand;
use crate::events::{EventBus, Topic};
use crate::workers::{AttackKind, Command};

/// Client-facing handle to interact with a running battle
#[derive(Clone)]
pub struct BattleHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl BattleHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn command<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<std::result::Result<T, CommandError>>) -> Command,
    ) -> Result<T> {
        Ok(self.request(build).await??)
    }

    /// Builds the turn order and starts the first turn. Subscribe before
    /// calling this to see `BattleStarted`.
    pub async fn start(&self) -> Result<()> {
        self.request(|reply| Command::Start { reply }).await
    }

    pub async fn select_target(
        &self,
        actor: BattlerId,
        target: BattlerId,
    ) -> Result<TargetSelection> {
        self.command(|reply| Command::SelectTarget {
            actor,
            target,
            reply,
        })
        .await
    }

    pub async fn normal_attack(&self, actor: BattlerId) -> Result<ActionTicket> {
        self.attack(actor, AttackKind::Normal).await
    }

    pub async fn strong_attack(&self, actor: BattlerId) -> Result<ActionTicket> {
        self.attack(actor, AttackKind::Strong).await
    }

    pub async fn use_skill(&self, actor: BattlerId) -> Result<ActionTicket> {
        self.attack(actor, AttackKind::Skill).await
    }

    async fn attack(&self, actor: BattlerId, kind: AttackKind) -> Result<ActionTicket> {
        self.command(|reply| Command::Attack { actor, kind, reply })
            .await
    }

    pub async fn end_turn(&self, actor: BattlerId) -> Result<()> {
        self.command(|reply| Command::EndTurn { actor, reply }).await
    }

    /// Runs one provider decision.
    pub async fn issue(&self, actor: BattlerId, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::SelectTarget(target) => {
                self.select_target(actor, target).await.map(drop)
            }
            PlayerCommand::NormalAttack => self.normal_attack(actor).await.map(drop),
            PlayerCommand::StrongAttack => self.strong_attack(actor).await.map(drop),
            PlayerCommand::UseSkill => self.use_skill(actor).await.map(drop),
            PlayerCommand::EndTurn => self.end_turn(actor).await,
        }
    }

    /// Reports completion of an action performed by an actor outside the
    /// runtime's dispatcher.
    pub async fn complete_action(&self, ticket: ActionTicket) -> Result<()> {
        self.command(|reply| Command::CompleteAction { ticket, reply })
            .await
    }

    /// Read-only snapshot of the battle.
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BattleEvent> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<BattleEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
