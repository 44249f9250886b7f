//! Combat Resolver: damage, attacks, skills and cooldowns.
//!
//! The resolver borrows battlers for the duration of one call and returns
//! results; it never holds references across turns. Cooldown readiness is
//! exposed through [`CombatResolver::is_skill_ready`] but not enforced here,
//! so tests and tools can force a skill.
mod damage;
mod skill;

pub use damage::{AppliedDamage, Damageable, apply_damage, calculate_damage};
pub use skill::{SkillCategory, SkillProfile};

use tracing::debug;

use crate::config::BattleConfig;
use crate::env::RollStream;
use crate::event::EventSink;
use crate::state::Battler;
use crate::status::StatusEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatResolver {
    minimum_damage: u32,
    strong_attack_multiplier: u32,
}

impl CombatResolver {
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            minimum_damage: config.minimum_damage.max(1),
            strong_attack_multiplier: config.strong_attack_multiplier,
        }
    }

    pub fn apply_damage<T: Damageable + ?Sized>(&self, target: &mut T, raw: u32) -> AppliedDamage {
        apply_damage(target, raw, self.minimum_damage)
    }

    pub fn normal_attack(&self, attacker: &Battler, target: &mut Battler) -> AppliedDamage {
        self.apply_damage(target, attacker.atk)
    }

    pub fn strong_attack(&self, attacker: &Battler, target: &mut Battler) -> AppliedDamage {
        let raw = attacker.atk.saturating_mul(self.strong_attack_multiplier);
        self.apply_damage(target, raw)
    }

    /// Uses the attacker's skill against `targets`.
    ///
    /// Area skills hit every living target; targeted skills hit up to
    /// `max_targets` of them, chosen at random. Each hit rolls `apply_chance`
    /// for the skill's status effect. The cooldown is set even when nothing
    /// was hit. Returns an empty list when the attacker has no skill.
    pub fn use_skill(
        &self,
        attacker: &mut Battler,
        targets: &mut [&mut Battler],
        rolls: &mut RollStream,
        sink: &dyn EventSink,
    ) -> Vec<AppliedDamage> {
        let Some(skill) = attacker.skill.clone() else {
            return Vec::new();
        };
        attacker.skill_cooldown_remaining = skill.cooldown_turns;

        let living: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, target)| target.is_alive())
            .map(|(index, _)| index)
            .collect();
        let chosen: Vec<usize> = match skill.category {
            SkillCategory::AreaOfEffect => living,
            SkillCategory::TargetedEffect => rolls
                .choose_up_to(living.len(), skill.max_targets.max(1) as usize)
                .into_iter()
                .map(|pick| living[pick])
                .collect(),
        };

        debug!(
            target: "battle::combat",
            attacker = %attacker.id,
            skill = %skill.name,
            hits = chosen.len(),
            "skill used",
        );

        let mut results = Vec::with_capacity(chosen.len());
        for index in chosen {
            let target = &mut *targets[index];
            results.push(self.apply_damage(target, skill.damage));
            if let Some(effect) = skill.effect
                && rolls.chance(skill.apply_chance)
            {
                StatusEngine::apply(target, effect, sink);
            }
        }
        results
    }

    /// Turn-start bookkeeping: the skill cooldown drops by one, floor 0.
    pub fn on_turn_start(&self, battler: &mut Battler) {
        battler.skill_cooldown_remaining = battler.skill_cooldown_remaining.saturating_sub(1);
    }

    pub fn is_skill_ready(&self, battler: &Battler) -> bool {
        battler.is_skill_ready()
    }
}
