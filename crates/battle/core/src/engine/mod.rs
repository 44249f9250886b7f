//! Turn Scheduler / Battle State Machine.
//!
//! [`BattleEngine`] is the only owner of the roster, the turn context, the
//! reward ledger and the pending actor action. Collaborators talk to it
//! through commands and read it through [`BattleSnapshot`].
//!
//! A turn runs as: status tick → approach action → effect resolution →
//! cleanup/outcome check → return action → end of turn. Actor actions are
//! asynchronous: the engine dispatches one and returns, and the collaborator
//! later calls [`BattleEngine::complete_action`]. At most one action is in
//! flight at any time.
mod actions;
mod commands;
mod errors;
mod guard;
mod snapshot;
mod turns;

pub use commands::TargetSelection;
pub use errors::{CommandError, CommandKind};
pub use snapshot::{BattleSnapshot, BattlerView};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::combat::CombatResolver;
use crate::config::BattleConfig;
use crate::env::{ActionDispatcher, ActionRequest, BattleContext};
use crate::event::{BattleEvent, EventSink};
use crate::outcome::{BattleOutcome, RewardLedger, VictoryReport};
use crate::registry::BattlerRegistry;
use crate::state::{ActionTicket, BattlePhase, Battler, BattlerId, TurnContext};

use actions::PendingAction;
use guard::{DebounceGate, ProcessingLock};

pub struct BattleEngine {
    ctx: BattleContext,
    resolver: CombatResolver,
    registry: BattlerRegistry,
    turn: TurnContext,
    ledger: RewardLedger,
    dispatcher: Box<dyn ActionDispatcher>,
    sink: Arc<dyn EventSink>,
    pending: Option<PendingAction>,
    /// When the current monster's action is due, while in `AwaitingMonsterTurn`.
    monster_due_at: Option<Duration>,
    /// Actions the dispatcher could not run; completed by `drain_inline`.
    inline: VecDeque<ActionTicket>,
    next_ticket: u64,
    lock: ProcessingLock,
    end_turn_gate: DebounceGate,
    target_gate: DebounceGate,
    consecutive_timeouts: u32,
    started: bool,
    outcome: Option<BattleOutcome>,
}

impl BattleEngine {
    pub fn new(
        ctx: BattleContext,
        registry: BattlerRegistry,
        dispatcher: Box<dyn ActionDispatcher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let resolver = CombatResolver::new(&ctx.config);
        let end_turn_gate = DebounceGate::new(ctx.config.end_turn_debounce());
        let target_gate = DebounceGate::new(ctx.config.select_target_debounce());
        Self {
            ctx,
            resolver,
            registry,
            turn: TurnContext::new(),
            ledger: RewardLedger::new(),
            dispatcher,
            sink,
            pending: None,
            monster_due_at: None,
            inline: VecDeque::new(),
            next_ticket: 1,
            lock: ProcessingLock::default(),
            end_turn_gate,
            target_gate,
            consecutive_timeouts: 0,
            started: false,
            outcome: None,
        }
    }

    /// Starts the battle and selects the first turn.
    pub fn start(&mut self) {
        if self.started {
            warn!(target: "battle::engine", "start called twice; ignored");
            return;
        }
        self.started = true;
        info!(
            target: "battle::engine",
            battlers = self.registry.len(),
            seed = self.ctx.seed(),
            "battle started",
        );
        self.sink.publish(BattleEvent::BattleStarted {
            order: self.registry.turn_order(),
        });
        self.sink.publish(BattleEvent::RoundStarted {
            round: self.turn.round,
        });
        self.with_lock(|engine| engine.select_next_turn());
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &BattleConfig {
        &self.ctx.config
    }

    pub fn registry(&self) -> &BattlerRegistry {
        &self.registry
    }

    pub fn turn(&self) -> &TurnContext {
        &self.turn
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn phase(&self) -> BattlePhase {
        self.turn.phase
    }

    pub fn round(&self) -> u32 {
        self.turn.round
    }

    pub fn turn_index(&self) -> usize {
        self.turn.turn_index
    }

    pub fn current_battler(&self) -> Option<&Battler> {
        self.turn
            .current
            .and_then(|id| self.registry.get_by_id(id))
    }

    pub fn is_current_turn(&self, battler: BattlerId) -> bool {
        self.turn.current == Some(battler)
    }

    pub fn selected_target(&self) -> Option<BattlerId> {
        self.turn.selected_target
    }

    pub fn pending_action(&self) -> Option<ActionRequest> {
        self.pending.map(|pending| pending.request)
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    // ========================================================================
    // Internal plumbing
    // ========================================================================

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.outcome.is_some() {
            return Err(CommandError::BattleOver);
        }
        if !self.started {
            return Err(CommandError::NotStarted);
        }
        Ok(())
    }

    /// Runs `f` under the processing lock, then completes any inline actions.
    /// Returns `None` if the lock is already held, which `&mut self` rules out
    /// for direct callers.
    fn with_lock<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.lock.try_acquire() {
            return None;
        }
        let result = f(self);
        self.drain_inline();
        self.lock.release();
        Some(result)
    }

    fn drain_inline(&mut self) {
        while let Some(ticket) = self.inline.pop_front() {
            self.resolve_completion(ticket, false);
        }
    }

    fn publish(&self, event: BattleEvent) {
        self.sink.publish(event);
    }

    /// Ends the battle. Later calls are ignored.
    fn finish(&mut self, outcome: BattleOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.pending = None;
        self.monster_due_at = None;
        self.inline.clear();
        self.turn.current = None;
        self.turn.phase = BattlePhase::default();

        match &outcome {
            BattleOutcome::Victory(report) => {
                info!(
                    target: "battle::engine",
                    round = self.turn.round,
                    total_exp = report.total_exp,
                    rewards = report.rewards.len(),
                    "battle won",
                );
                self.grant_exp(report);
            }
            BattleOutcome::Defeat => {
                info!(target: "battle::engine", round = self.turn.round, "battle lost");
            }
            BattleOutcome::Aborted(reason) => {
                error!(target: "battle::engine", ?reason, "battle aborted");
            }
            BattleOutcome::Ongoing => {}
        }

        self.publish(BattleEvent::BattleEnded {
            outcome: outcome.clone(),
        });
        self.outcome = Some(outcome);
    }

    fn grant_exp(&self, report: &VictoryReport) {
        for grant in &report.grants {
            if let Some(source) = self
                .registry
                .get_by_id(grant.battler)
                .and_then(Battler::source)
            {
                source.gain_exp(grant.amount);
            }
        }
    }
}
