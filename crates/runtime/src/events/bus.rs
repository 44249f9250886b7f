//! Topic-based event bus implementation.

use std::collections::HashMap;

use battle_core::{BattleEvent, EventSink};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Battle start, rounds, turns, target selection and actor actions
    Turn,
    /// Status effects applied, refreshed or expired
    Status,
    /// Damage and removals
    Combat,
    /// Final outcome
    Outcome,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Turn, Topic::Status, Topic::Combat, Topic::Outcome];

    pub fn of(event: &BattleEvent) -> Self {
        match event {
            BattleEvent::StatusChanged { .. } => Topic::Status,
            BattleEvent::DamageDealt { .. } | BattleEvent::BattlerRemoved { .. } => Topic::Combat,
            BattleEvent::BattleEnded { .. } => Topic::Outcome,
            BattleEvent::BattleStarted { .. }
            | BattleEvent::RoundStarted { .. }
            | BattleEvent::TurnStarted { .. }
            | BattleEvent::TurnSkipped { .. }
            | BattleEvent::TurnEnded { .. }
            | BattleEvent::ActionDispatched { .. }
            | BattleEvent::ActionCompleted { .. }
            | BattleEvent::TargetSelected { .. } => Topic::Turn,
        }
    }

    const fn index(self) -> usize {
        match self {
            Topic::Turn => 0,
            Topic::Status => 1,
            Topic::Combat => 2,
            Topic::Outcome => 3,
        }
    }
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front. Publishing never
/// blocks; events sent while a topic has no subscriber are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: [broadcast::Sender<BattleEvent>; 4],
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: std::array::from_fn(|_| broadcast::channel(capacity).0),
        }
    }

    pub fn publish(&self, event: BattleEvent) {
        let topic = Topic::of(&event);
        if self.channels[topic.index()].send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BattleEvent> {
        self.channels[topic.index()].subscribe()
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<BattleEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: BattleEvent) {
        EventBus::publish(self, event);
    }
}
