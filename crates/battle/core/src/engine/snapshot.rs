use crate::env::ActionRequest;
use crate::outcome::BattleOutcome;
use crate::state::{BattlePhase, Battler, BattlerId, StatusEffectKind};

use super::BattleEngine;

/// Read-only view of one battler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlerView {
    pub id: BattlerId,
    pub name: String,
    pub is_monster: bool,
    pub alive: bool,
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
    /// `(kind, remaining_turns)` in insertion order.
    pub statuses: Vec<(StatusEffectKind, u32)>,
    pub has_skill: bool,
    pub skill_cooldown_remaining: u32,
}

impl From<&Battler> for BattlerView {
    fn from(battler: &Battler) -> Self {
        Self {
            id: battler.id,
            name: battler.name.clone(),
            is_monster: battler.is_monster,
            alive: battler.is_alive(),
            hp: battler.hp(),
            max_hp: battler.max_hp(),
            atk: battler.atk,
            def: battler.def,
            speed: battler.speed,
            statuses: battler
                .statuses
                .iter()
                .map(|effect| (effect.kind(), effect.remaining_turns))
                .collect(),
            has_skill: battler.skill.is_some(),
            skill_cooldown_remaining: battler.skill_cooldown_remaining,
        }
    }
}

impl BattlerView {
    pub fn skill_ready(&self) -> bool {
        self.has_skill && self.skill_cooldown_remaining == 0
    }
}

/// Read-only view of the whole battle for UIs and command providers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSnapshot {
    pub phase: BattlePhase,
    pub round: u32,
    pub turn_index: usize,
    pub current: Option<BattlerId>,
    pub selected_target: Option<BattlerId>,
    pub pending: Option<ActionRequest>,
    /// Battlers in turn order.
    pub battlers: Vec<BattlerView>,
    pub outcome: Option<BattleOutcome>,
}

impl BattleSnapshot {
    pub fn battler(&self, id: BattlerId) -> Option<&BattlerView> {
        self.battlers.iter().find(|view| view.id == id)
    }

    pub fn current_battler(&self) -> Option<&BattlerView> {
        self.current.and_then(|id| self.battler(id))
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &BattlerView> {
        self.battlers
            .iter()
            .filter(|view| view.is_monster && view.alive)
    }

    /// The player waiting for a command, if any.
    pub fn awaiting_player(&self) -> Option<&BattlerView> {
        if self.phase != BattlePhase::AwaitingPlayerInput
            || self.pending.is_some()
            || self.outcome.is_some()
        {
            return None;
        }
        self.current_battler().filter(|view| !view.is_monster)
    }
}

impl BattleEngine {
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            phase: self.turn.phase,
            round: self.turn.round,
            turn_index: self.turn.turn_index,
            current: self.turn.current,
            selected_target: self.turn.selected_target,
            pending: self.pending_action(),
            battlers: self.registry.iter().map(BattlerView::from).collect(),
            outcome: self.outcome.clone(),
        }
    }
}
