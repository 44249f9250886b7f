//! Deterministic turn-resolution core for turn-based battles.
//!
//! `battle-core` owns the combat rules (turn order, status effects, damage,
//! rewards) and exposes them through [`engine::BattleEngine`], a synchronous
//! state machine. Movement and animation live outside the crate: the engine
//! dispatches an [`ActionRequest`] and waits for [`BattleEngine::complete_action`].
//! Async shells and loaders depend on the types re-exported here.
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod outcome;
pub mod registry;
pub mod state;
pub mod status;

pub use combat::{AppliedDamage, CombatResolver, Damageable, SkillCategory, SkillProfile};
pub use config::BattleConfig;
pub use engine::{
    BattleEngine, BattleSnapshot, BattlerView, CommandError, CommandKind, TargetSelection,
};
pub use env::{
    ActionDispatcher, ActionQueue, ActionRequest, ActorActionKind, BattleContext, Clock,
    DispatchStatus, ManualClock, NoActors, PcgRng, RngOracle, RollStream, StatSource,
    SystemClock, compute_seed,
};
pub use error::{BattleError, ErrorSeverity};
pub use event::{BattleEvent, DamageCause, EventLog, EventSink, NullSink, StatusChange};
pub use outcome::{
    AbortReason, BattleOutcome, ExpGrant, Reward, RewardLedger, VictoryReport, distribute_exp,
};
pub use registry::{
    BattlerRegistry, CleanupReport, RemovalReason, RemovedBattler, RosterDiagnostic,
};
pub use state::{
    ActionTicket, Backing, BattlePhase, Battler, BattlerId, BattlerStats, RewardSpec,
    StatusEffectInstance, StatusEffectKind, StatusEffects, StatusPayload, TurnContext,
};
pub use status::{ApplyOutcome, StatusEngine, TickReport};
