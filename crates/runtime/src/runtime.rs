//! High-level runtime orchestrator.
//!
//! The runtime owns the battle worker, wires up the command, completion and
//! event channels, and exposes a builder-based API for clients.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    BattleConfig, BattleContext, BattleEngine, BattleError, BattleEvent, BattleOutcome,
    BattlerId, BattlerRegistry,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::{
    ActorAction, BattleHandle, PlayerProvider, Result, RuntimeError, TaskDispatcher,
};
use crate::clock::TokioClock;
use crate::events::{EventBus, Topic};
use crate::workers::BattleWorker;

/// Runtime configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Battle seed. Drawn at random when unset.
    pub seed: Option<u64>,
    /// How often the worker polls the engine for due monster turns and
    /// stuck actions.
    pub poll_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            seed: None,
            poll_interval: Duration::from_millis(50),
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BATTLE_SEED`
    /// - `BATTLE_POLL_INTERVAL_MS`
    /// - `BATTLE_ACTION_TIMEOUT_MS` / `BATTLE_MONSTER_DELAY_MS`
    /// - `BATTLE_EVENT_BUFFER` / `BATTLE_COMMAND_BUFFER`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(seed) = read_env::<u64>("BATTLE_SEED") {
            self.seed = Some(seed);
        }

        if let Some(ms) = read_env::<u64>("BATTLE_POLL_INTERVAL_MS") {
            self.poll_interval = Duration::from_millis(ms.max(1));
        }

        if let Some(ms) = read_env::<u64>("BATTLE_ACTION_TIMEOUT_MS") {
            self.battle.action_timeout_ms = ms;
        }

        if let Some(ms) = read_env::<u64>("BATTLE_MONSTER_DELAY_MS") {
            self.battle.monster_turn_delay_ms = ms;
        }

        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            self.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("BATTLE_COMMAND_BUFFER") {
            self.command_buffer_size = capacity.max(1);
        }

        self
    }

    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Owns the battle worker and drives player turns through a
/// [`PlayerProvider`].
///
/// [`BattleHandle`] provides a cloneable façade for other clients.
pub struct BattleRuntime {
    handle: BattleHandle,
    player_provider: Option<Box<dyn PlayerProvider>>,
    worker_handle: JoinHandle<()>,
    outcome_rx: broadcast::Receiver<BattleEvent>,
    poll_interval: Duration,
    seed: u64,
}

impl BattleRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this battle
    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    /// Seed the battle was built with; replaying it reproduces every roll.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_player_provider(&mut self, provider: impl PlayerProvider + 'static) {
        self.player_provider = Some(Box::new(provider));
    }

    /// Starts the battle (if needed) and plays it to the end, asking the
    /// player provider whenever a player awaits input.
    pub async fn run_until_finished(&mut self) -> Result<BattleOutcome> {
        let provider = self
            .player_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet)?;

        self.handle.start().await?;

        loop {
            if let Some(outcome) = Self::ended(&mut self.outcome_rx) {
                return Ok(outcome);
            }

            let snapshot = self.handle.snapshot().await?;
            if let Some(outcome) = snapshot.outcome.clone() {
                return Ok(outcome);
            }

            let Some(actor) = snapshot.awaiting_player().map(|view| view.id) else {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            };

            let command = provider.next_command(actor, &snapshot).await?;
            debug!(target: "runtime::battle", battler = %actor, ?command, "player command");
            match self.handle.issue(actor, command).await {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => {
                    debug!(target: "runtime::battle", battler = %actor, %err, "command deferred");
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn ended(outcome_rx: &mut broadcast::Receiver<BattleEvent>) -> Option<BattleOutcome> {
        loop {
            match outcome_rx.try_recv() {
                Ok(BattleEvent::BattleEnded { outcome }) => return Some(outcome),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker exits once every [`BattleHandle`] clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`BattleRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    registry: Option<BattlerRegistry>,
    actors: HashMap<BattlerId, Arc<dyn ActorAction>>,
    default_actor: Option<Arc<dyn ActorAction>>,
    player_provider: Option<Box<dyn PlayerProvider>>,
    event_bus: Option<EventBus>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            registry: None,
            actors: HashMap::new(),
            default_actor: None,
            player_provider: None,
            event_bus: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required roster
    pub fn registry(mut self, registry: BattlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Actor that performs actions for one battler.
    pub fn actor(mut self, battler: BattlerId, actor: impl ActorAction + 'static) -> Self {
        self.actors.insert(battler, Arc::new(actor));
        self
    }

    /// Actor for battlers without their own. Without one, those battlers'
    /// actions complete inline.
    pub fn default_actor(mut self, actor: impl ActorAction + 'static) -> Self {
        self.default_actor = Some(Arc::new(actor));
        self
    }

    pub fn player_provider(mut self, provider: impl PlayerProvider + 'static) -> Self {
        self.player_provider = Some(Box::new(provider));
        self
    }

    /// Share an existing bus instead of creating one.
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Build the runtime and spawn its worker. The battle starts on the first
    /// [`BattleHandle::start`] or [`BattleRuntime::run_until_finished`].
    pub async fn build(self) -> Result<BattleRuntime> {
        let registry = self.registry.ok_or(RuntimeError::MissingRoster)?;
        let seed = self.config.resolve_seed();
        let buffer = self.config.command_buffer_size.max(1);

        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let outcome_rx = event_bus.subscribe(Topic::Outcome);

        let (command_tx, command_rx) = mpsc::channel(buffer);
        let (completion_tx, completion_rx) = mpsc::channel(buffer);

        let dispatcher = TaskDispatcher::new(self.actors, self.default_actor, completion_tx);
        let ctx = BattleContext::new(self.config.battle, Arc::new(TokioClock::new()), seed);
        let engine = BattleEngine::new(
            ctx,
            registry,
            Box::new(dispatcher),
            Arc::new(event_bus.clone()),
        );

        let worker = BattleWorker::new(engine, command_rx, completion_rx, self.config.poll_interval);
        let worker_handle = tokio::spawn(worker.run());

        info!(target: "runtime::battle", seed, "battle runtime built");

        Ok(BattleRuntime {
            handle: BattleHandle::new(command_tx, event_bus),
            player_provider: self.player_provider,
            worker_handle,
            outcome_rx,
            poll_interval: self.config.poll_interval.max(Duration::from_millis(1)),
            seed,
        })
    }
}
