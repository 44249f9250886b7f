//! Errors returned by engine commands.
//!
//! Every variant is recovered locally: a rejected command leaves the battle
//! state exactly as it was.
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{ActionTicket, BattlePhase, BattlerId};

/// Which engine entry point produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    SelectTarget,
    NormalAttack,
    StrongAttack,
    UseSkill,
    EndTurn,
    CompleteAction,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    #[error("{command} is not allowed during {phase}")]
    InvalidState {
        command: CommandKind,
        phase: BattlePhase,
    },

    #[error("it is not {battler}'s turn")]
    NotCurrentTurn { battler: BattlerId },

    #[error("{ticket} is still in flight")]
    ActionInFlight { ticket: ActionTicket },

    #[error("{battler} has no skill equipped")]
    NoSkill { battler: BattlerId },

    #[error("skill of {battler} is cooling down ({remaining} turns left)")]
    SkillNotReady { battler: BattlerId, remaining: u32 },

    #[error("no living target available")]
    NoTarget,

    #[error("{battler} cannot be targeted by the player")]
    InvalidTarget { battler: BattlerId },

    #[error("battler {battler} no longer exists")]
    StaleReference { battler: BattlerId },

    #[error("duplicate {command} rejected")]
    ReentrancyRejected { command: CommandKind },

    #[error("{ticket} does not match the pending action")]
    UnknownTicket { ticket: ActionTicket },

    #[error("battle is already over")]
    BattleOver,

    #[error("battle has not started")]
    NotStarted,
}

impl BattleError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActionInFlight { .. }
            | Self::SkillNotReady { .. }
            | Self::ReentrancyRejected { .. } => ErrorSeverity::Recoverable,
            Self::InvalidState { .. }
            | Self::NotCurrentTurn { .. }
            | Self::NoSkill { .. }
            | Self::NoTarget
            | Self::InvalidTarget { .. }
            | Self::StaleReference { .. }
            | Self::UnknownTicket { .. }
            | Self::NotStarted => ErrorSeverity::Validation,
            Self::BattleOver => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } => "COMMAND_INVALID_STATE",
            Self::NotCurrentTurn { .. } => "COMMAND_NOT_CURRENT_TURN",
            Self::ActionInFlight { .. } => "COMMAND_ACTION_IN_FLIGHT",
            Self::NoSkill { .. } => "COMMAND_NO_SKILL",
            Self::SkillNotReady { .. } => "COMMAND_SKILL_NOT_READY",
            Self::NoTarget => "COMMAND_NO_TARGET",
            Self::InvalidTarget { .. } => "COMMAND_INVALID_TARGET",
            Self::StaleReference { .. } => "COMMAND_STALE_REFERENCE",
            Self::ReentrancyRejected { .. } => "COMMAND_REENTRANCY_REJECTED",
            Self::UnknownTicket { .. } => "COMMAND_UNKNOWN_TICKET",
            Self::BattleOver => "COMMAND_BATTLE_OVER",
            Self::NotStarted => "COMMAND_NOT_STARTED",
        }
    }
}
