//! Topic-based event bus for battle events.
//!
//! The engine publishes every [`battle_core::BattleEvent`] through the bus;
//! consumers subscribe only to the topics they need.

mod bus;

pub use bus::{EventBus, Topic};
