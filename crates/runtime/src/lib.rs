//! Async runtime shell around the battle engine.
//!
//! A single worker task owns the [`battle_core::BattleEngine`]; everything
//! else talks to it through channels. Consumers build a [`BattleRuntime`],
//! drive it with a [`PlayerProvider`] or issue commands through a cloneable
//! [`BattleHandle`], and subscribe to battle events by [`Topic`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`clock`] adapts tokio time to the engine's clock
//! - `workers` keeps the engine task internal to the crate
pub mod api;
pub mod clock;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ActorAction, AutoPlayer, BattleHandle, ImmediateActorAction, PacedActorAction, PlayerCommand,
    PlayerProvider, Result, RuntimeError, TaskDispatcher,
};
pub use clock::TokioClock;
pub use events::{EventBus, Topic};
pub use runtime::{BattleRuntime, RuntimeBuilder, RuntimeConfig};
