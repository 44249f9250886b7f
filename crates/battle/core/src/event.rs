//! Observable battle events and the sink that receives them.
//!
//! The engine publishes every state transition as a [`BattleEvent`]. Sinks are
//! fire-and-forget: `publish` must not block and has no return value.
use std::sync::Mutex;

use crate::env::ActionRequest;
use crate::outcome::BattleOutcome;
use crate::registry::RemovalReason;
use crate::state::{ActionTicket, BattlePhase, BattlerId, StatusEffectKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusChange {
    Applied,
    Refreshed,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageCause {
    Attack,
    StrongAttack,
    Skill,
    StatusTick,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    BattleStarted {
        order: Vec<BattlerId>,
    },
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        battler: BattlerId,
        round: u32,
        turn_index: usize,
        phase: BattlePhase,
    },
    TurnSkipped {
        battler: BattlerId,
        kind: StatusEffectKind,
    },
    TurnEnded {
        battler: BattlerId,
    },
    StatusChanged {
        battler: BattlerId,
        kind: StatusEffectKind,
        change: StatusChange,
    },
    DamageDealt {
        source: Option<BattlerId>,
        target: BattlerId,
        dealt: u32,
        hp_after: u32,
        cause: DamageCause,
    },
    ActionDispatched {
        request: ActionRequest,
    },
    ActionCompleted {
        ticket: ActionTicket,
        battler: BattlerId,
        timed_out: bool,
    },
    TargetSelected {
        target: BattlerId,
    },
    BattlerRemoved {
        battler: BattlerId,
        reason: RemovalReason,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Short name for logs and topic routing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BattleStarted { .. } => "battle_started",
            Self::RoundStarted { .. } => "round_started",
            Self::TurnStarted { .. } => "turn_started",
            Self::TurnSkipped { .. } => "turn_skipped",
            Self::TurnEnded { .. } => "turn_ended",
            Self::StatusChanged { .. } => "status_changed",
            Self::DamageDealt { .. } => "damage_dealt",
            Self::ActionDispatched { .. } => "action_dispatched",
            Self::ActionCompleted { .. } => "action_completed",
            Self::TargetSelected { .. } => "target_selected",
            Self::BattlerRemoved { .. } => "battler_removed",
            Self::BattleEnded { .. } => "battle_ended",
        }
    }
}

/// Receives battle events. Must not block the engine.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: BattleEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: BattleEvent) {}
}

/// In-memory event recorder.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<BattleEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<BattleEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn take(&self) -> Vec<BattleEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(battler, kind, change)` triples in publish order.
    pub fn status_changes(&self) -> Vec<(BattlerId, StatusEffectKind, StatusChange)> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|event| match event {
                BattleEvent::StatusChanged {
                    battler,
                    kind,
                    change,
                } => Some((*battler, *kind, *change)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: BattleEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
