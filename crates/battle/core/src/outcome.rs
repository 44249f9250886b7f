//! Outcome & Reward Aggregator.
//!
//! Monster removals feed a pending reward list; [`RewardLedger::check_battle_end`]
//! decides the battle result and, on victory, finalizes and clears the list.
use tracing::debug;

use crate::registry::BattlerRegistry;
use crate::state::{ActionTicket, Battler, BattlerId};

/// One defeated monster's contribution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reward {
    pub source: BattlerId,
    pub name: String,
    pub quantity: u32,
    pub rarity_or_slot: u32,
    pub exp_value: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpGrant {
    pub battler: BattlerId,
    pub amount: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictoryReport {
    pub rewards: Vec<Reward>,
    pub total_exp: u32,
    /// Per-survivor split of `total_exp`, in roster order.
    pub grants: Vec<ExpGrant>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbortReason {
    /// No battler was left in the roster.
    EmptyRoster,
    /// No living battler could be found to take the next turn.
    NoLivingBattler,
    /// An actor action timed out too many times in a row.
    ActorActionTimeout {
        battler: BattlerId,
        ticket: ActionTicket,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    #[default]
    Ongoing,
    Defeat,
    Victory(VictoryReport),
    Aborted(AbortReason),
}

impl BattleOutcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, Self::Victory(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Defeat => "defeat",
            Self::Victory(_) => "victory",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Pending rewards for the current battle.
#[derive(Clone, Debug, Default)]
pub struct RewardLedger {
    pending: Vec<Reward>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reward for `monster`. A second record for the same
    /// `(source, exp_value)` pair is dropped. Returns whether it was added.
    pub fn record_defeat(&mut self, monster: &Battler) -> bool {
        let duplicate = self.pending.iter().any(|reward| {
            reward.source == monster.id && reward.exp_value == monster.reward.exp_value
        });
        if duplicate {
            debug!(
                target: "battle::outcome",
                battler = %monster.id,
                "defeat already recorded",
            );
            return false;
        }
        self.pending.push(Reward {
            source: monster.id,
            name: monster.name.clone(),
            quantity: 1,
            rarity_or_slot: monster.reward.rarity_or_slot,
            exp_value: monster.reward.exp_value,
        });
        true
    }

    pub fn pending(&self) -> &[Reward] {
        &self.pending
    }

    pub fn total_pending_exp(&self) -> u32 {
        self.pending
            .iter()
            .fold(0u32, |total, reward| total.saturating_add(reward.exp_value))
    }

    /// Defeat when no living player remains, victory when no living monster
    /// remains. Victory drains the pending list into the report.
    pub fn check_battle_end(&mut self, registry: &BattlerRegistry) -> BattleOutcome {
        if registry.living_players().next().is_none() {
            return BattleOutcome::Defeat;
        }
        if registry.living_monsters().next().is_some() {
            return BattleOutcome::Ongoing;
        }

        let total_exp = self.total_pending_exp();
        let survivors: Vec<BattlerId> = registry.living_players().map(|b| b.id).collect();
        BattleOutcome::Victory(VictoryReport {
            rewards: std::mem::take(&mut self.pending),
            total_exp,
            grants: distribute_exp(total_exp, &survivors),
        })
    }
}

/// Splits `total_exp` evenly; the first `total_exp % n` survivors get one
/// extra point so the grants always sum to `total_exp`.
pub fn distribute_exp(total_exp: u32, survivors: &[BattlerId]) -> Vec<ExpGrant> {
    let count = survivors.len() as u32;
    if count == 0 {
        return Vec::new();
    }
    let share = total_exp / count;
    let remainder = (total_exp % count) as usize;
    survivors
        .iter()
        .enumerate()
        .map(|(i, &battler)| ExpGrant {
            battler,
            amount: share + u32::from(i < remainder),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Damageable;
    use crate::state::{BattlerStats, RewardSpec};

    fn goblin(id: u32, exp: u32) -> Battler {
        Battler::monster(BattlerId(id), "Goblin", BattlerStats::new(10, 10, 3, 2, 5))
            .with_reward(RewardSpec { exp_value: exp, rarity_or_slot: 1 })
    }

    #[test]
    fn exp_split_conserves_total() {
        let survivors = [BattlerId(0), BattlerId(1), BattlerId(2)];
        let grants = distribute_exp(100, &survivors);
        let amounts: Vec<u32> = grants.iter().map(|g| g.amount).collect();
        assert_eq!(amounts, vec![34, 33, 33]);
        assert_eq!(amounts.iter().sum::<u32>(), 100);
        assert!(distribute_exp(10, &[]).is_empty());
    }

    #[test]
    fn duplicate_defeat_is_recorded_once() {
        let mut ledger = RewardLedger::new();
        let first = goblin(3, 15);
        assert!(ledger.record_defeat(&first));
        assert!(!ledger.record_defeat(&first));
        // same name, different source
        assert!(ledger.record_defeat(&goblin(4, 15)));
        assert_eq!(ledger.pending().len(), 2);
    }

    #[test]
    fn victory_finalizes_and_clears_pending() {
        let mut dead = goblin(1, 25);
        dead.take_damage(100);
        let hero = Battler::player(BattlerId(0), "Hero", BattlerStats::new(20, 20, 8, 1, 10));
        let mut registry = BattlerRegistry::from_battlers(vec![hero, dead]);
        let mut ledger = RewardLedger::new();
        registry.cleanup_dead(&mut ledger);

        let BattleOutcome::Victory(report) = ledger.check_battle_end(&registry) else {
            panic!("expected victory");
        };
        assert_eq!(report.total_exp, 25);
        assert_eq!(report.rewards.len(), 1);
        assert_eq!(report.rewards[0].quantity, 1);
        assert_eq!(report.grants, vec![ExpGrant { battler: BattlerId(0), amount: 25 }]);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn defeat_when_no_player_is_alive() {
        let registry = BattlerRegistry::from_battlers(vec![goblin(1, 5)]);
        assert_eq!(
            RewardLedger::new().check_battle_end(&registry),
            BattleOutcome::Defeat
        );
    }
}
