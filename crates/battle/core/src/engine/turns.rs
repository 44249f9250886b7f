use tracing::{debug, info};

use crate::event::{BattleEvent, DamageCause};
use crate::outcome::{AbortReason, BattleOutcome};
use crate::registry::CleanupReport;
use crate::state::{BattlePhase, BattlerId};
use crate::status::StatusEngine;

use super::BattleEngine;

/// Turn selection, round tracking and roster cleanup.
impl BattleEngine {
    /// Selects the next battler and starts its turn.
    ///
    /// Only does something between turns (before the first turn, or after the
    /// battle has been stalled by an external removal). Returns whether a
    /// selection pass ran.
    pub fn advance_turn(&mut self) -> bool {
        if !self.started || self.outcome.is_some() {
            return false;
        }
        if self.pending.is_some() || self.turn.current.is_some() {
            debug!(target: "battle::engine", "advance_turn ignored: a turn is in progress");
            return false;
        }
        self.with_lock(|engine| engine.select_next_turn()).is_some()
    }

    /// Bounded search for the next living battler, starting at `turn_index`.
    ///
    /// Every pass either starts a turn, ends the battle, or consumes one
    /// battler (death by status tick or a stunned turn), so the loop ends.
    pub(super) fn select_next_turn(&mut self) {
        loop {
            self.cleanup();
            if self.registry.is_empty() {
                self.finish(BattleOutcome::Aborted(AbortReason::EmptyRoster));
                return;
            }
            let outcome = self.ledger.check_battle_end(&self.registry);
            if outcome.is_finished() {
                self.finish(outcome);
                return;
            }
            let Some(index) = self.next_living_index() else {
                self.finish(BattleOutcome::Aborted(AbortReason::NoLivingBattler));
                return;
            };
            self.turn.turn_index = index;

            let Some(battler) = self.registry.get_mut(index) else {
                self.finish(BattleOutcome::Aborted(AbortReason::NoLivingBattler));
                return;
            };
            let id = battler.id;
            let is_monster = battler.is_monster;
            self.resolver.on_turn_start(battler);
            let report = StatusEngine::tick(battler, self.sink.as_ref());

            if report.total_damage > 0 {
                let hit = self.resolver.apply_damage(battler, report.total_damage);
                self.sink.publish(BattleEvent::DamageDealt {
                    source: None,
                    target: id,
                    dealt: hit.dealt,
                    hp_after: hit.hp_after,
                    cause: DamageCause::StatusTick,
                });
                if hit.target_died {
                    debug!(
                        target: "battle::engine",
                        battler = %id,
                        "battler died from status effects before acting",
                    );
                    continue;
                }
            }

            self.turn.current = Some(id);
            if let Some(kind) = report.skip_action {
                debug!(target: "battle::engine", battler = %id, %kind, "turn skipped");
                self.publish(BattleEvent::TurnSkipped { battler: id, kind });
                self.close_turn();
                continue;
            }

            if is_monster {
                let delay = self.ctx.config.monster_turn_delay();
                self.turn.phase = BattlePhase::AwaitingMonsterTurn;
                self.monster_due_at = Some(self.ctx.now() + delay);
                self.publish_turn_started(id);
                if delay.is_zero() {
                    self.begin_monster_action();
                }
            } else {
                self.turn.phase = BattlePhase::AwaitingPlayerInput;
                self.publish_turn_started(id);
            }
            return;
        }
    }

    fn next_living_index(&self) -> Option<usize> {
        let len = self.registry.len();
        (0..len)
            .map(|offset| (self.turn.turn_index + offset) % len)
            .find(|&index| {
                self.registry
                    .get(index)
                    .is_some_and(|battler| battler.is_alive())
            })
    }

    fn publish_turn_started(&self, battler: BattlerId) {
        debug!(
            target: "battle::engine",
            battler = %battler,
            round = self.turn.round,
            turn_index = self.turn.turn_index,
            phase = %self.turn.phase,
            "turn started",
        );
        self.publish(BattleEvent::TurnStarted {
            battler,
            round: self.turn.round,
            turn_index: self.turn.turn_index,
            phase: self.turn.phase,
        });
    }

    /// Ends the current turn and starts the next one.
    pub(super) fn finish_turn(&mut self) {
        self.close_turn();
        self.end_turn_gate.stamp(self.ctx.now());
        self.select_next_turn();
    }

    /// Marks the current battler as acted and moves `turn_index` past it.
    fn close_turn(&mut self) {
        let Some(id) = self.turn.current.take() else {
            return;
        };
        self.monster_due_at = None;
        self.publish(BattleEvent::TurnEnded { battler: id });

        // A battler removed mid-turn has no slot left; cleanup already
        // pointed turn_index at its successor.
        if let Some(index) = self.registry.index_of(id) {
            self.turn.acted_this_round.insert(id);
            self.turn.turn_index = (index + 1) % self.registry.len();
        }
        self.check_round_complete();
    }

    /// Starts a new round once every living battler has acted.
    fn check_round_complete(&mut self) {
        if self.turn.acted_this_round.is_empty() {
            return;
        }
        let mut living = self.registry.iter().filter(|b| b.is_alive()).peekable();
        if living.peek().is_none() {
            return;
        }
        let acted = &self.turn.acted_this_round;
        if !living.all(|battler| acted.contains(&battler.id)) {
            return;
        }

        self.turn.acted_this_round.clear();
        self.turn.round += 1;
        info!(target: "battle::engine", round = self.turn.round, "round completed");
        self.publish(BattleEvent::RoundStarted {
            round: self.turn.round,
        });
    }

    /// Removes dead and vanished battlers and keeps turn bookkeeping aligned.
    pub(super) fn cleanup(&mut self) -> CleanupReport {
        let report = self.registry.cleanup_dead(&mut self.ledger);
        if report.is_empty() {
            return report;
        }

        // highest index first, so each comparison sees the original slot
        for removed in &report.removed {
            if removed.index < self.turn.turn_index {
                self.turn.turn_index -= 1;
            }
            self.turn.acted_this_round.remove(&removed.id);
            if self.turn.selected_target == Some(removed.id) {
                self.turn.selected_target = None;
            }
            self.publish(BattleEvent::BattlerRemoved {
                battler: removed.id,
                reason: removed.reason,
            });
        }
        if self.turn.turn_index >= self.registry.len() {
            self.turn.turn_index = 0;
        }
        self.check_round_complete();
        report
    }
}
