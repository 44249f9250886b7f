//! Actor Actions: the asynchronous "move to target / move back" work an
//! external actor performs for a battler.
//!
//! The engine hands every [`ActionRequest`] to a [`TaskDispatcher`], which
//! runs the battler's [`ActorAction`] on its own task and reports the ticket
//! back to the worker once `perform` returns.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use battle_core::{ActionDispatcher, ActionRequest, ActionTicket, BattlerId, DispatchStatus};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Work performed by an external actor for one action request.
///
/// Returning from `perform` means the action finished; the runtime then
/// completes the ticket. An implementation that never returns is caught by
/// the engine's watchdog.
#[async_trait]
pub trait ActorAction: Send + Sync {
    async fn perform(&self, request: ActionRequest);
}

/// Completes every action as soon as its task runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateActorAction;

#[async_trait]
impl ActorAction for ImmediateActorAction {
    async fn perform(&self, _request: ActionRequest) {}
}

/// Takes a fixed time per action, like an animation would.
#[derive(Clone, Copy, Debug)]
pub struct PacedActorAction(pub Duration);

#[async_trait]
impl ActorAction for PacedActorAction {
    async fn perform(&self, _request: ActionRequest) {
        tokio::time::sleep(self.0).await;
    }
}

/// [`ActionDispatcher`] that runs Actor Actions on tokio tasks.
///
/// Battlers without an actor (and dispatches made outside a tokio runtime)
/// report [`DispatchStatus::Unavailable`], which makes the engine complete
/// the action inline.
pub struct TaskDispatcher {
    actors: HashMap<BattlerId, Arc<dyn ActorAction>>,
    fallback: Option<Arc<dyn ActorAction>>,
    completion_tx: mpsc::Sender<ActionTicket>,
}

impl TaskDispatcher {
    pub(crate) fn new(
        actors: HashMap<BattlerId, Arc<dyn ActorAction>>,
        fallback: Option<Arc<dyn ActorAction>>,
        completion_tx: mpsc::Sender<ActionTicket>,
    ) -> Self {
        Self {
            actors,
            fallback,
            completion_tx,
        }
    }

    fn actor_for(&self, battler: BattlerId) -> Option<Arc<dyn ActorAction>> {
        self.actors
            .get(&battler)
            .or(self.fallback.as_ref())
            .map(Arc::clone)
    }
}

impl ActionDispatcher for TaskDispatcher {
    fn dispatch(&self, request: &ActionRequest) -> DispatchStatus {
        let Some(actor) = self.actor_for(request.actor) else {
            return DispatchStatus::Unavailable;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                target: "runtime::actors",
                ticket = %request.ticket,
                "dispatch outside a tokio runtime; completing inline",
            );
            return DispatchStatus::Unavailable;
        };

        let request = *request;
        let completion_tx = self.completion_tx.clone();
        runtime.spawn(async move {
            actor.perform(request).await;
            if completion_tx.send(request.ticket).await.is_err() {
                debug!(
                    target: "runtime::actors",
                    ticket = %request.ticket,
                    "worker gone before completion was delivered",
                );
            }
        });
        DispatchStatus::Accepted
    }
}
