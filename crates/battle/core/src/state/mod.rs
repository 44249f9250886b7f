//! Battle state types: battlers, status effects and the turn context.
mod battler;
mod common;
mod status;
mod turn;

pub use battler::{Backing, Battler, BattlerStats, RewardSpec};
pub use common::{ActionTicket, BattlerId};
pub use status::{StatusEffectInstance, StatusEffectKind, StatusEffects, StatusPayload};
pub use turn::{BattlePhase, TurnContext};
