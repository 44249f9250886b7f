use std::time::Duration;

use tracing::{debug, error, warn};

use crate::env::{ActionRequest, ActorActionKind, DispatchStatus};
use crate::event::{BattleEvent, DamageCause};
use crate::outcome::{AbortReason, BattleOutcome};
use crate::state::{ActionTicket, BattlePhase, Battler, BattlerId};

use super::{BattleEngine, CommandError, CommandKind};

#[derive(Clone, Copy, Debug)]
pub(super) struct PendingAction {
    pub(super) request: ActionRequest,
    pub(super) dispatched_at: Duration,
}

/// Actor action dispatch, completion and the watchdog.
impl BattleEngine {
    /// Completion entry point for actor actions.
    ///
    /// Resolves the approach effect (or ends the turn after a return) and
    /// drives the scheduler forward. A ticket that does not match the pending
    /// action is rejected without touching state.
    pub fn complete_action(&mut self, ticket: ActionTicket) -> Result<(), CommandError> {
        self.ensure_running()?;
        if !self
            .pending
            .is_some_and(|pending| pending.request.ticket == ticket)
        {
            debug!(target: "battle::engine", %ticket, "completion for unknown ticket");
            return Err(CommandError::UnknownTicket { ticket });
        }
        self.consecutive_timeouts = 0;
        self.with_lock(|engine| engine.resolve_completion(ticket, false))
            .ok_or(CommandError::ReentrancyRejected {
                command: CommandKind::CompleteAction,
            })
    }

    /// Starts due monster turns, ends turns whose battler vanished and runs
    /// the action watchdog. Call periodically.
    pub fn poll(&mut self) {
        if !self.started || self.outcome.is_some() {
            return;
        }
        self.with_lock(|engine| engine.run_timers());
    }

    fn run_timers(&mut self) {
        let now = self.ctx.now();
        self.release_stale_turn();

        let monster_due = self.turn.phase == BattlePhase::AwaitingMonsterTurn
            && self.pending.is_none()
            && self.monster_due_at.is_some_and(|due| now >= due);
        if monster_due {
            self.begin_monster_action();
        }

        self.check_watchdog(now);
    }

    fn release_stale_turn(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(id) = self.turn.current else {
            return;
        };
        if self.registry.get_by_id(id).is_some_and(Battler::is_alive) {
            return;
        }
        warn!(
            target: "battle::engine",
            battler = %id,
            "current battler vanished mid-turn; ending its turn",
        );
        self.finish_turn();
    }

    fn check_watchdog(&mut self, now: Duration) {
        let Some(timeout) = self.ctx.config.action_timeout() else {
            return;
        };
        let Some(pending) = self.pending else {
            return;
        };
        if now.saturating_sub(pending.dispatched_at) < timeout {
            return;
        }

        let request = pending.request;
        self.consecutive_timeouts += 1;
        if self.consecutive_timeouts >= self.ctx.config.max_action_timeouts {
            error!(
                target: "battle::engine",
                ticket = %request.ticket,
                battler = %request.actor,
                timeouts = self.consecutive_timeouts,
                "actor action keeps timing out",
            );
            self.finish(BattleOutcome::Aborted(AbortReason::ActorActionTimeout {
                battler: request.actor,
                ticket: request.ticket,
            }));
            return;
        }
        warn!(
            target: "battle::engine",
            ticket = %request.ticket,
            battler = %request.actor,
            kind = %request.kind,
            "actor action timed out; forcing completion",
        );
        self.resolve_completion(request.ticket, true);
    }

    /// Picks a random living player and dispatches the monster's attack.
    pub(super) fn begin_monster_action(&mut self) {
        self.monster_due_at = None;
        let Some(actor) = self.turn.current else {
            return;
        };
        let players: Vec<BattlerId> = self.registry.living_players().map(|b| b.id).collect();
        let Some(pick) = self.ctx.rolls_mut().pick_index(players.len()) else {
            // nobody to hit; the next selection pass reports the defeat
            self.finish_turn();
            return;
        };
        self.turn.phase = BattlePhase::MonsterActing;
        self.dispatch_action(actor, ActorActionKind::Attack, Some(players[pick]));
    }

    pub(super) fn dispatch_action(
        &mut self,
        actor: BattlerId,
        kind: ActorActionKind,
        target: Option<BattlerId>,
    ) -> ActionTicket {
        let ticket = ActionTicket(self.next_ticket);
        self.next_ticket += 1;
        let request = ActionRequest {
            ticket,
            actor,
            kind,
            target,
        };
        self.pending = Some(PendingAction {
            request,
            dispatched_at: self.ctx.now(),
        });

        debug!(
            target: "battle::engine",
            %ticket,
            battler = %actor,
            %kind,
            "actor action dispatched",
        );
        self.publish(BattleEvent::ActionDispatched { request });

        if self.dispatcher.dispatch(&request) == DispatchStatus::Unavailable {
            debug!(
                target: "battle::engine",
                %ticket,
                battler = %actor,
                "no actor available; completing inline",
            );
            self.inline.push_back(ticket);
        }
        ticket
    }

    pub(super) fn resolve_completion(&mut self, ticket: ActionTicket, timed_out: bool) {
        let Some(pending) = self
            .pending
            .take_if(|pending| pending.request.ticket == ticket)
        else {
            return;
        };
        let request = pending.request;
        self.publish(BattleEvent::ActionCompleted {
            ticket,
            battler: request.actor,
            timed_out,
        });

        if !request.kind.is_approach() {
            self.finish_turn();
            return;
        }

        self.resolve_effect(&request);
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

        if self
            .registry
            .get_by_id(request.actor)
            .is_some_and(Battler::is_alive)
        {
            self.turn.phase = BattlePhase::ActorReturning;
            self.dispatch_action(request.actor, ActorActionKind::ReturnToStart, None);
        } else {
            self.finish_turn();
        }
    }

    fn resolve_effect(&mut self, request: &ActionRequest) {
        let (cause, hits) = match request.kind {
            ActorActionKind::Attack | ActorActionKind::StrongAttack => {
                let Some(target_id) = request.target else {
                    return;
                };
                let Some((attacker, mut targets)) = self
                    .registry
                    .split_for_action(request.actor, |b| b.id == target_id)
                else {
                    warn!(
                        target: "battle::engine",
                        battler = %request.actor,
                        "attacker vanished before its action resolved",
                    );
                    return;
                };
                let Some(target) = targets.pop() else {
                    debug!(
                        target: "battle::engine",
                        target_id = %target_id,
                        "target gone before the hit landed",
                    );
                    return;
                };
                if request.kind == ActorActionKind::StrongAttack {
                    (
                        DamageCause::StrongAttack,
                        vec![self.resolver.strong_attack(attacker, target)],
                    )
                } else {
                    (
                        DamageCause::Attack,
                        vec![self.resolver.normal_attack(attacker, target)],
                    )
                }
            }
            ActorActionKind::Cast => {
                let Some(caster_is_monster) = self
                    .registry
                    .get_by_id(request.actor)
                    .map(|caster| caster.is_monster)
                else {
                    warn!(
                        target: "battle::engine",
                        battler = %request.actor,
                        "caster vanished before its skill resolved",
                    );
                    return;
                };
                let Some((caster, mut targets)) = self
                    .registry
                    .split_for_action(request.actor, |b| {
                        b.is_alive() && b.is_monster != caster_is_monster
                    })
                else {
                    return;
                };
                let hits = self.resolver.use_skill(
                    caster,
                    &mut targets,
                    self.ctx.rolls_mut(),
                    self.sink.as_ref(),
                );
                (DamageCause::Skill, hits)
            }
            ActorActionKind::ReturnToStart => return,
        };

        for hit in hits.into_iter().filter(|hit| hit.dealt > 0) {
            self.publish(BattleEvent::DamageDealt {
                source: Some(request.actor),
                target: hit.target,
                dealt: hit.dealt,
                hp_after: hit.hp_after,
                cause,
            });
        }
    }
}
