//! Data-driven battle content.
//!
//! Loads rosters (RON) and battle tuning (TOML) and turns roster entries into
//! shared [`CombatantSheet`]s that the battle core reads through its
//! [`battle_core::StatSource`] trait.
//!
//! Content lives outside battle state: the registry snapshots sheets at
//! battle start and only writes back damage and EXP.

pub mod loaders;
pub mod sheet;

pub use loaders::{
    CombatantSpec, ConfigLoader, ContentFactory, LoadResult, Roster, RosterLoader,
};
pub use sheet::CombatantSheet;
