use tracing::{debug, warn};

use crate::env::ActorActionKind;
use crate::event::BattleEvent;
use crate::state::{ActionTicket, BattlePhase, BattlerId};

use super::{BattleEngine, CommandError, CommandKind};

/// Result of a successful `select_target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSelection {
    Changed,
    /// The target was already selected; nothing happened.
    Unchanged,
}

/// Player commands. All of them are validated against the current phase and
/// turn and leave state untouched when rejected.
impl BattleEngine {
    /// Ends the current turn.
    ///
    /// Rejected while another transition holds the processing lock, while an
    /// actor action is in flight, and inside the debounce window of the last
    /// accepted end of turn.
    pub fn end_turn(&mut self) -> Result<(), CommandError> {
        self.ensure_running()?;
        match self.with_lock(|engine| engine.end_turn_locked()) {
            Some(result) => result,
            None => {
                debug!(target: "battle::engine", "end_turn while processing; dropped");
                Err(CommandError::ReentrancyRejected {
                    command: CommandKind::EndTurn,
                })
            }
        }
    }

    fn end_turn_locked(&mut self) -> Result<(), CommandError> {
        if let Some(pending) = self.pending {
            return Err(CommandError::ActionInFlight {
                ticket: pending.request.ticket,
            });
        }
        let Some(current) = self.turn.current else {
            return Err(CommandError::InvalidState {
                command: CommandKind::EndTurn,
                phase: self.turn.phase,
            });
        };
        if !self.end_turn_gate.is_open(self.ctx.now()) {
            debug!(
                target: "battle::engine",
                battler = %current,
                "end_turn inside debounce window; dropped",
            );
            return Err(CommandError::ReentrancyRejected {
                command: CommandKind::EndTurn,
            });
        }
        debug!(target: "battle::engine", battler = %current, "turn ended by command");
        self.finish_turn();
        Ok(())
    }

    /// Selects the enemy the player's next attack goes to.
    ///
    /// Only accepted on a player's turn, while waiting for input or while the
    /// player's own action returns; an in-flight action keeps its target.
    /// Reselecting the current target is a no-op. A different target inside
    /// the debounce window of the last change is rejected.
    pub fn select_target(&mut self, target: BattlerId) -> Result<TargetSelection, CommandError> {
        self.ensure_running()?;
        let phase = self.turn.phase;
        let players_turn = self
            .current_battler()
            .is_some_and(|battler| !battler.is_monster);
        if !players_turn
            || !matches!(
                phase,
                BattlePhase::AwaitingPlayerInput | BattlePhase::ActorReturning
            )
        {
            debug!(
                target: "battle::engine",
                target_id = %target,
                %phase,
                "target selection outside a player's turn; rejected",
            );
            return Err(CommandError::InvalidState {
                command: CommandKind::SelectTarget,
                phase,
            });
        }
        let Some(battler) = self
            .registry
            .get_by_id(target)
            .filter(|battler| battler.is_alive())
        else {
            warn!(target: "battle::engine", target_id = %target, "selected target no longer exists");
            return Err(CommandError::StaleReference { battler: target });
        };
        if !battler.is_monster {
            return Err(CommandError::InvalidTarget { battler: target });
        }
        if self.turn.selected_target == Some(target) {
            return Ok(TargetSelection::Unchanged);
        }
        if !self.target_gate.admit(self.ctx.now()) {
            debug!(
                target: "battle::engine",
                target_id = %target,
                "target change inside debounce window; dropped",
            );
            return Err(CommandError::ReentrancyRejected {
                command: CommandKind::SelectTarget,
            });
        }

        self.turn.selected_target = Some(target);
        debug!(target: "battle::engine", target_id = %target, "target selected");
        self.publish(BattleEvent::TargetSelected { target });
        Ok(TargetSelection::Changed)
    }

    pub fn issue_normal_attack(&mut self) -> Result<ActionTicket, CommandError> {
        self.issue_attack(CommandKind::NormalAttack, ActorActionKind::Attack)
    }

    pub fn issue_strong_attack(&mut self) -> Result<ActionTicket, CommandError> {
        self.issue_attack(CommandKind::StrongAttack, ActorActionKind::StrongAttack)
    }

    fn issue_attack(
        &mut self,
        command: CommandKind,
        kind: ActorActionKind,
    ) -> Result<ActionTicket, CommandError> {
        let actor = self.validate_player_command(command)?;
        let target = self.resolve_player_target()?;
        self.with_lock(|engine| engine.dispatch_action(actor, kind, Some(target)))
            .ok_or(CommandError::ReentrancyRejected { command })
    }

    /// Uses the current player's skill. Rejected while it is cooling down.
    pub fn issue_skill(&mut self) -> Result<ActionTicket, CommandError> {
        let actor = self.validate_player_command(CommandKind::UseSkill)?;
        let Some(caster) = self.registry.get_by_id(actor) else {
            return Err(CommandError::StaleReference { battler: actor });
        };
        if caster.skill.is_none() {
            return Err(CommandError::NoSkill { battler: actor });
        }
        if !self.resolver.is_skill_ready(caster) {
            return Err(CommandError::SkillNotReady {
                battler: actor,
                remaining: caster.skill_cooldown_remaining,
            });
        }
        if self.registry.living_monsters().next().is_none() {
            return Err(CommandError::NoTarget);
        }
        let target = self.turn.selected_target;
        self.with_lock(|engine| engine.dispatch_action(actor, ActorActionKind::Cast, target))
            .ok_or(CommandError::ReentrancyRejected {
                command: CommandKind::UseSkill,
            })
    }

    /// Ends the current player's turn without acting.
    pub fn issue_end_turn(&mut self) -> Result<(), CommandError> {
        self.validate_player_command(CommandKind::EndTurn)?;
        self.end_turn()
    }

    /// Rejects commands issued on behalf of a battler whose turn it is not.
    pub fn ensure_current_turn(&self, battler: BattlerId) -> Result<(), CommandError> {
        self.ensure_running()?;
        if self.is_current_turn(battler) {
            Ok(())
        } else {
            Err(CommandError::NotCurrentTurn { battler })
        }
    }

    fn validate_player_command(&self, command: CommandKind) -> Result<BattlerId, CommandError> {
        self.ensure_running()?;
        if self.turn.phase != BattlePhase::AwaitingPlayerInput {
            debug!(
                target: "battle::engine",
                %command,
                phase = %self.turn.phase,
                "command rejected in current phase",
            );
            return Err(CommandError::InvalidState {
                command,
                phase: self.turn.phase,
            });
        }
        if let Some(pending) = self.pending {
            return Err(CommandError::ActionInFlight {
                ticket: pending.request.ticket,
            });
        }
        let Some(current) = self.turn.current else {
            return Err(CommandError::InvalidState {
                command,
                phase: self.turn.phase,
            });
        };
        match self.registry.get_by_id(current) {
            Some(battler) if battler.is_monster => {
                Err(CommandError::NotCurrentTurn { battler: current })
            }
            Some(battler) if battler.is_alive() => Ok(current),
            _ => Err(CommandError::StaleReference { battler: current }),
        }
    }

    /// Selected target if it is still a living monster, else the first living
    /// monster in turn order.
    fn resolve_player_target(&self) -> Result<BattlerId, CommandError> {
        if let Some(selected) = self.turn.selected_target
            && self
                .registry
                .get_by_id(selected)
                .is_some_and(|battler| battler.is_monster && battler.is_alive())
        {
            return Ok(selected);
        }
        self.registry
            .living_monsters()
            .next()
            .map(|battler| battler.id)
            .ok_or(CommandError::NoTarget)
    }
}
