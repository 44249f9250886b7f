use std::collections::BTreeSet;

use super::BattlerId;

/// Scheduler phase of the current turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    /// A monster's approach action is in flight (or about to be).
    #[default]
    MonsterActing,
    /// The current battler is a living player waiting for a command.
    AwaitingPlayerInput,
    /// The acting battler is playing its return-to-start action.
    ActorReturning,
    /// A monster's turn has started and its action is waiting for the pacing delay.
    AwaitingMonsterTurn,
}

/// Scheduler-owned turn bookkeeping. One per battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnContext {
    /// Index into the registry's turn order.
    pub turn_index: usize,
    pub phase: BattlePhase,
    /// Starts at 1.
    pub round: u32,
    /// Battlers that have finished a turn in the current round.
    pub acted_this_round: BTreeSet<BattlerId>,
    pub selected_target: Option<BattlerId>,
    /// Battler whose turn is active, if any.
    pub current: Option<BattlerId>,
}

impl TurnContext {
    pub fn new() -> Self {
        Self {
            turn_index: 0,
            phase: BattlePhase::default(),
            round: 1,
            acted_this_round: BTreeSet::new(),
            selected_target: None,
            current: None,
        }
    }

    pub fn has_acted(&self, id: BattlerId) -> bool {
        self.acted_this_round.contains(&id)
    }
}

impl Default for TurnContext {
    fn default() -> Self {
        Self::new()
    }
}
