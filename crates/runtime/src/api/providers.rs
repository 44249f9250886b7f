//! Asynchronous abstraction for sourcing player commands.
//!
//! Runtime users plug in [`PlayerProvider`] implementations so a battle can
//! run with human input, scripted fixtures, or simple policies.
use async_trait::async_trait;
use battle_core::{BattleSnapshot, BattlerId};

use super::errors::Result;

/// One player decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    SelectTarget(BattlerId),
    NormalAttack,
    StrongAttack,
    UseSkill,
    EndTurn,
}

/// Source of commands for players awaiting input.
#[async_trait]
pub trait PlayerProvider: Send + Sync {
    /// Decide what `actor` does, given a snapshot taken while it awaits input.
    async fn next_command(
        &self,
        actor: BattlerId,
        snapshot: &BattleSnapshot,
    ) -> Result<PlayerCommand>;
}

/// Plays every player turn on its own: the skill when it is ready, otherwise
/// an attack on the selected (or first living) monster.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoPlayer {
    strong_attacks: bool,
}

impl AutoPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use strong attacks instead of normal ones.
    pub fn with_strong_attacks(mut self) -> Self {
        self.strong_attacks = true;
        self
    }

    pub fn decide(&self, actor: BattlerId, snapshot: &BattleSnapshot) -> PlayerCommand {
        let skill_ready = snapshot
            .battler(actor)
            .is_some_and(|view| view.skill_ready());
        if snapshot.living_monsters().next().is_none() {
            PlayerCommand::EndTurn
        } else if skill_ready {
            PlayerCommand::UseSkill
        } else if self.strong_attacks {
            PlayerCommand::StrongAttack
        } else {
            PlayerCommand::NormalAttack
        }
    }
}

#[async_trait]
impl PlayerProvider for AutoPlayer {
    async fn next_command(
        &self,
        actor: BattlerId,
        snapshot: &BattleSnapshot,
    ) -> Result<PlayerCommand> {
        Ok(self.decide(actor, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        BattleConfig, BattleContext, BattleEngine, Battler, BattlerRegistry, BattlerStats,
        ManualClock, NoActors, NullSink, SkillCategory, SkillProfile,
    };

    use super::*;

    fn engine(caster: Battler) -> BattleEngine {
        let goblin = Battler::monster(BattlerId(1), "Goblin", BattlerStats::new(50, 50, 2, 0, 1));
        let ctx = BattleContext::new(BattleConfig::default(), Arc::new(ManualClock::new()), 3);
        let mut engine = BattleEngine::new(
            ctx,
            BattlerRegistry::from_battlers(vec![caster, goblin]),
            Box::new(NoActors),
            Arc::new(NullSink),
        );
        engine.start();
        engine
    }

    #[test]
    fn prefers_a_ready_skill() {
        let caster = Battler::player(BattlerId(0), "Mage", BattlerStats::new(20, 20, 3, 0, 9))
            .with_skill(SkillProfile::new("Bolt", SkillCategory::TargetedEffect, 6).with_cooldown(2));
        let mut engine = engine(caster);
        let auto = AutoPlayer::new();

        assert_eq!(auto.decide(BattlerId(0), &engine.snapshot()), PlayerCommand::UseSkill);
        engine.issue_skill().unwrap();
        assert_eq!(
            auto.decide(BattlerId(0), &engine.snapshot()),
            PlayerCommand::NormalAttack
        );
    }

    #[test]
    fn strong_attacks_when_configured() {
        let fighter = Battler::player(BattlerId(0), "Brute", BattlerStats::new(20, 20, 3, 0, 9));
        let engine = engine(fighter);
        let auto = AutoPlayer::new().with_strong_attacks();
        assert_eq!(
            auto.decide(BattlerId(0), &engine.snapshot()),
            PlayerCommand::StrongAttack
        );
    }
}
