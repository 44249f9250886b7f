//! Battler Registry: the roster arena and its turn order.
//!
//! One `Vec<Battler>` holds both combat stats and the external-actor link, so
//! there are no parallel lists to drift apart. Index `i` is turn-order slot
//! `i`; identity is the stable [`BattlerId`].
use std::sync::Arc;

use tracing::{debug, warn};

use crate::env::StatSource;
use crate::outcome::RewardLedger;
use crate::state::{Battler, BattlerId};

/// Why a roster slot was left out at build time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RosterDiagnostic {
    MissingStatSource { slot: usize },
    InvalidStats { slot: usize, name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalReason {
    Defeated,
    BackingGone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedBattler {
    pub id: BattlerId,
    pub name: String,
    /// Turn-order index the battler occupied before removal.
    pub index: usize,
    pub is_monster: bool,
    pub reason: RemovalReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Removed battlers, highest index first.
    pub removed: Vec<RemovedBattler>,
    pub any_monster_died: bool,
    pub any_player_died: bool,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn removed_ids(&self) -> Vec<BattlerId> {
        self.removed.iter().map(|removed| removed.id).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BattlerRegistry {
    battlers: Vec<Battler>,
    diagnostics: Vec<RosterDiagnostic>,
}

impl BattlerRegistry {
    /// Builds the roster from stat-source slots.
    ///
    /// Slot `i` becomes `BattlerId(i)`. Missing sources and sources reporting
    /// `max_hp == 0` are skipped with a diagnostic.
    pub fn build_turn_order<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Option<Arc<dyn StatSource>>>,
    {
        let mut battlers = Vec::new();
        let mut diagnostics = Vec::new();

        for (slot, source) in sources.into_iter().enumerate() {
            let id = BattlerId(slot as u32);
            let Some(source) = source else {
                warn!(target: "battle::registry", slot, "roster slot has no stat source; skipped");
                diagnostics.push(RosterDiagnostic::MissingStatSource { slot });
                continue;
            };
            match Battler::from_source(id, &source) {
                Some(battler) => battlers.push(battler),
                None => {
                    warn!(
                        target: "battle::registry",
                        slot,
                        name = source.name(),
                        "stat source reports max_hp == 0; skipped",
                    );
                    diagnostics.push(RosterDiagnostic::InvalidStats {
                        slot,
                        name: source.name().to_owned(),
                    });
                }
            }
        }

        let mut registry = Self {
            battlers,
            diagnostics,
        };
        registry.sort_turn_order();
        registry
    }

    /// Builds the roster from ready-made battlers, keeping their ids.
    pub fn from_battlers(battlers: Vec<Battler>) -> Self {
        let mut registry = Self {
            battlers,
            diagnostics: Vec::new(),
        };
        registry.sort_turn_order();
        registry
    }

    /// Speed descending, then name, then id.
    fn sort_turn_order(&mut self) {
        self.battlers.sort_by(|a, b| {
            b.speed
                .cmp(&a.speed)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    pub fn diagnostics(&self) -> &[RosterDiagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.battlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battlers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Battler> {
        self.battlers.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Battler> {
        self.battlers.get_mut(index)
    }

    pub fn get_by_id(&self, id: BattlerId) -> Option<&Battler> {
        self.battlers.iter().find(|battler| battler.id == id)
    }

    pub fn index_of(&self, id: BattlerId) -> Option<usize> {
        self.battlers.iter().position(|battler| battler.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Battler> {
        self.battlers.iter()
    }

    /// Ids in turn order.
    pub fn turn_order(&self) -> Vec<BattlerId> {
        self.battlers.iter().map(|battler| battler.id).collect()
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Battler> {
        self.battlers
            .iter()
            .filter(|battler| !battler.is_monster && battler.is_alive())
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &Battler> {
        self.battlers
            .iter()
            .filter(|battler| battler.is_monster && battler.is_alive())
    }

    /// Borrows `actor` mutably alongside every other battler matching `pred`.
    pub(crate) fn split_for_action<F>(
        &mut self,
        actor: BattlerId,
        pred: F,
    ) -> Option<(&mut Battler, Vec<&mut Battler>)>
    where
        F: Fn(&Battler) -> bool,
    {
        let mut attacker = None;
        let mut others = Vec::new();
        for battler in self.battlers.iter_mut() {
            if battler.id == actor {
                attacker = Some(battler);
            } else if pred(&*battler) {
                others.push(battler);
            }
        }
        attacker.map(|attacker| (attacker, others))
    }

    /// Removes one battler. Monsters are recorded as reward sources first.
    pub fn remove(&mut self, id: BattlerId, ledger: &mut RewardLedger) -> Option<RemovedBattler> {
        let index = self.index_of(id)?;
        Some(self.remove_at(index, ledger))
    }

    fn remove_at(&mut self, index: usize, ledger: &mut RewardLedger) -> RemovedBattler {
        if self.battlers[index].is_monster {
            ledger.record_defeat(&self.battlers[index]);
        }
        let mut battler = self.battlers.remove(index);
        battler.clear_statuses();
        let reason = if battler.is_backing_gone() {
            RemovalReason::BackingGone
        } else {
            RemovalReason::Defeated
        };
        debug!(
            target: "battle::registry",
            battler = %battler.id,
            name = %battler.name,
            index,
            %reason,
            "battler removed",
        );
        RemovedBattler {
            id: battler.id,
            name: battler.name,
            index,
            is_monster: battler.is_monster,
            reason,
        }
    }

    /// Removes every battler with `hp == 0` or a dropped backing object.
    ///
    /// Scans back to front so removal never shifts an unvisited index.
    pub fn cleanup_dead(&mut self, ledger: &mut RewardLedger) -> CleanupReport {
        let mut report = CleanupReport::default();
        for index in (0..self.battlers.len()).rev() {
            if self.battlers[index].is_alive() {
                continue;
            }
            let removed = self.remove_at(index, ledger);
            if removed.is_monster {
                report.any_monster_died = true;
            } else {
                report.any_player_died = true;
            }
            report.removed.push(removed);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BattlerStats, RewardSpec};

    fn stats(speed: u32) -> BattlerStats {
        BattlerStats::new(10, 10, 4, 1, speed)
    }

    #[test]
    fn orders_by_speed_then_name_then_id() {
        let registry = BattlerRegistry::from_battlers(vec![
            Battler::player(BattlerId(0), "Cleric", stats(5)),
            Battler::monster(BattlerId(1), "Bat", stats(9)),
            Battler::player(BattlerId(2), "Archer", stats(5)),
            Battler::monster(BattlerId(3), "Archer", stats(5)),
        ]);
        assert_eq!(
            registry.turn_order(),
            vec![BattlerId(1), BattlerId(2), BattlerId(3), BattlerId(0)]
        );
    }

    #[test]
    fn cleanup_removes_back_to_front_and_records_monsters() {
        let mut registry = BattlerRegistry::from_battlers(vec![
            Battler::player(BattlerId(0), "Hero", stats(9)),
            Battler::monster(BattlerId(1), "Goblin", BattlerStats::new(0, 10, 4, 1, 5))
                .with_reward(RewardSpec { exp_value: 12, rarity_or_slot: 0 }),
            Battler::monster(BattlerId(2), "Slime", BattlerStats::new(0, 10, 4, 1, 1))
                .with_reward(RewardSpec { exp_value: 4, rarity_or_slot: 0 }),
        ]);
        let mut ledger = RewardLedger::new();

        let report = registry.cleanup_dead(&mut ledger);

        assert_eq!(report.removed_ids(), vec![BattlerId(2), BattlerId(1)]);
        assert_eq!(report.removed[0].index, 2);
        assert_eq!(report.removed[1].index, 1);
        assert!(report.any_monster_died);
        assert!(!report.any_player_died);
        assert_eq!(registry.turn_order(), vec![BattlerId(0)]);
        assert_eq!(ledger.pending().len(), 2);
        assert_eq!(ledger.total_pending_exp(), 16);
    }

    #[test]
    fn empty_roster_is_not_an_error() {
        let mut registry = BattlerRegistry::from_battlers(Vec::new());
        let report = registry.cleanup_dead(&mut RewardLedger::new());
        assert!(registry.is_empty());
        assert!(report.is_empty());
        assert_eq!(registry.remove(BattlerId(7), &mut RewardLedger::new()), None);
    }
}
