use std::sync::{Arc, Mutex};

use crate::state::{ActionTicket, BattlerId};

/// Movement/animation a battler plays for one step of its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorActionKind {
    Attack,
    StrongAttack,
    Cast,
    ReturnToStart,
}

impl ActorActionKind {
    /// Approach actions resolve their effect on completion.
    pub const fn is_approach(&self) -> bool {
        !matches!(self, Self::ReturnToStart)
    }
}

/// One dispatched actor action. Completion is reported back with the ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub ticket: ActionTicket,
    pub actor: BattlerId,
    pub kind: ActorActionKind,
    pub target: Option<BattlerId>,
}

/// Result of handing a request to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The action is running; completion arrives later through
    /// `BattleEngine::complete_action`.
    Accepted,
    /// No actor is available for this battler. The engine completes the
    /// action itself.
    Unavailable,
}

/// Starts actor actions. Must return without waiting for the action.
pub trait ActionDispatcher: Send {
    fn dispatch(&self, request: &ActionRequest) -> DispatchStatus;
}

/// Dispatcher with no actors at all: every action completes inline.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoActors;

impl ActionDispatcher for NoActors {
    fn dispatch(&self, _request: &ActionRequest) -> DispatchStatus {
        DispatchStatus::Unavailable
    }
}

/// Records requests for a driver that completes them later.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    requests: Arc<Mutex<Vec<ActionRequest>>>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every recorded request.
    pub fn drain(&self) -> Vec<ActionRequest> {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *requests)
    }

    pub fn last(&self) -> Option<ActionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionDispatcher for ActionQueue {
    fn dispatch(&self, request: &ActionRequest) -> DispatchStatus {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*request);
        DispatchStatus::Accepted
    }
}
