#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use battle_core::{
    ActionDispatcher, ActionQueue, BattleConfig, BattleContext, BattleEngine, BattleEvent,
    Battler, BattlerId, BattlerRegistry, BattlerStats, EventLog, ManualClock, NoActors,
    RewardSpec, StatSource,
};

pub struct Harness {
    pub engine: BattleEngine,
    pub clock: Arc<ManualClock>,
    pub actions: ActionQueue,
    pub log: Arc<EventLog>,
}

impl Harness {
    /// Engine whose actor actions wait in an [`ActionQueue`].
    pub fn queued(battlers: Vec<Battler>, config: BattleConfig) -> Self {
        let actions = ActionQueue::new();
        Self::with_dispatcher(battlers, config, actions.clone(), Box::new(actions))
    }

    /// Engine without actors: every action completes immediately.
    pub fn inline(battlers: Vec<Battler>, config: BattleConfig) -> Self {
        Self::with_dispatcher(battlers, config, ActionQueue::new(), Box::new(NoActors))
    }

    fn with_dispatcher(
        battlers: Vec<Battler>,
        config: BattleConfig,
        actions: ActionQueue,
        dispatcher: Box<dyn ActionDispatcher>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new());
        let log = Arc::new(EventLog::new());
        let ctx = BattleContext::new(config, clock.clone(), 7);
        let engine = BattleEngine::new(
            ctx,
            BattlerRegistry::from_battlers(battlers),
            dispatcher,
            log.clone(),
        );
        Self {
            engine,
            clock,
            actions,
            log,
        }
    }

    pub fn started(mut self) -> Self {
        self.engine.start();
        self
    }

    pub fn current(&self) -> Option<BattlerId> {
        self.engine.current_battler().map(|battler| battler.id)
    }

    pub fn hp(&self, id: BattlerId) -> Option<u32> {
        self.engine.registry().get_by_id(id).map(Battler::hp)
    }

    /// Completes the pending action and returns its ticket.
    pub fn complete_pending(&mut self) -> battle_core::ActionTicket {
        let request = self
            .engine
            .pending_action()
            .expect("an action should be pending");
        self.engine
            .complete_action(request.ticket)
            .expect("pending ticket should complete");
        request.ticket
    }

    pub fn dispatched_by(&self, actor: BattlerId) -> usize {
        self.log
            .events()
            .iter()
            .filter(|event| {
                matches!(event, BattleEvent::ActionDispatched { request } if request.actor == actor)
            })
            .count()
    }
}

pub const HERO: BattlerId = BattlerId(0);
pub const GOBLIN: BattlerId = BattlerId(1);
pub const SLIME: BattlerId = BattlerId(2);

pub fn hero() -> Battler {
    Battler::player(HERO, "Hero", BattlerStats::new(20, 20, 8, 1, 10))
}

pub fn goblin() -> Battler {
    Battler::monster(GOBLIN, "Goblin", BattlerStats::new(10, 10, 3, 2, 5))
        .with_reward(RewardSpec {
            exp_value: 30,
            rarity_or_slot: 1,
        })
}

pub fn slime() -> Battler {
    Battler::monster(SLIME, "Slime", BattlerStats::new(4, 4, 2, 0, 3)).with_reward(RewardSpec {
        exp_value: 11,
        rarity_or_slot: 0,
    })
}

/// Stat source backed by atomics, standing in for an external character.
#[derive(Debug)]
pub struct Sheet {
    pub name: String,
    pub monster: bool,
    pub hp: AtomicU32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
    pub exp_value: u32,
    pub exp: AtomicU32,
}

impl Sheet {
    pub fn new(name: &str, monster: bool, hp: u32, atk: u32, def: u32, speed: u32) -> Self {
        Self {
            name: name.to_owned(),
            monster,
            hp: AtomicU32::new(hp),
            max_hp: hp,
            atk,
            def,
            speed,
            exp_value: 0,
            exp: AtomicU32::new(0),
        }
    }

    pub fn worth(mut self, exp_value: u32) -> Self {
        self.exp_value = exp_value;
        self
    }

    pub fn shared(self) -> Arc<dyn StatSource> {
        Arc::new(self)
    }
}

impl StatSource for Sheet {
    fn name(&self) -> &str {
        &self.name
    }
    fn is_monster(&self) -> bool {
        self.monster
    }
    fn hp(&self) -> u32 {
        self.hp.load(Ordering::SeqCst)
    }
    fn max_hp(&self) -> u32 {
        self.max_hp
    }
    fn atk(&self) -> u32 {
        self.atk
    }
    fn def(&self) -> u32 {
        self.def
    }
    fn speed(&self) -> u32 {
        self.speed
    }
    fn take_damage(&self, amount: u32) {
        let hp = self.hp.load(Ordering::SeqCst);
        self.hp.store(hp.saturating_sub(amount), Ordering::SeqCst);
    }
    fn reward(&self) -> RewardSpec {
        RewardSpec {
            exp_value: self.exp_value,
            rarity_or_slot: 0,
        }
    }
    fn gain_exp(&self, amount: u32) {
        self.exp.fetch_add(amount, Ordering::SeqCst);
    }
}
