//! Public runtime API surface.
//!
//! Gathers the types consumers of the runtime use so the orchestrator and
//! worker modules can stay focused on plumbing.

pub mod actors;
pub mod errors;
pub mod handle;
pub mod providers;

pub use actors::{ActorAction, ImmediateActorAction, PacedActorAction, TaskDispatcher};
pub use errors::{Result, RuntimeError};
pub use handle::BattleHandle;
pub use providers::{AutoPlayer, PlayerCommand, PlayerProvider};
