//! Worker tasks that back the runtime orchestration.

mod battle;

pub use battle::{AttackKind, BattleWorker, Command};
