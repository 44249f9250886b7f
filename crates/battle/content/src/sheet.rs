use std::sync::atomic::{AtomicU32, Ordering};

use battle_core::{RewardSpec, SkillProfile, StatSource};

use crate::loaders::CombatantSpec;

/// Owned combatant loaded from content.
///
/// Lives outside the battle and outlives it: the registry keeps a weak link,
/// forwards damage here and pushes EXP on victory.
#[derive(Debug)]
pub struct CombatantSheet {
    name: String,
    is_monster: bool,
    hp: AtomicU32,
    max_hp: u32,
    atk: u32,
    def: u32,
    speed: u32,
    skill: Option<SkillProfile>,
    reward: RewardSpec,
    exp: AtomicU32,
}

impl CombatantSheet {
    pub fn from_spec(spec: &CombatantSpec) -> Self {
        let max_hp = spec.max_hp.unwrap_or(spec.hp);
        Self {
            name: spec.name.clone(),
            is_monster: spec.monster,
            hp: AtomicU32::new(spec.hp.min(max_hp)),
            max_hp,
            atk: spec.atk,
            def: spec.def,
            speed: spec.speed,
            skill: spec.skill.clone(),
            reward: spec.reward,
            exp: AtomicU32::new(0),
        }
    }

    /// EXP gained across battles.
    pub fn exp(&self) -> u32 {
        self.exp.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.hp() > 0
    }
}

impl StatSource for CombatantSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_monster(&self) -> bool {
        self.is_monster
    }

    fn hp(&self) -> u32 {
        self.hp.load(Ordering::Acquire)
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
        // the closure never returns None, so the update cannot fail
        let _ = self
            .hp
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |hp| {
                Some(hp.saturating_sub(amount))
            });
    }

    fn skill(&self) -> Option<SkillProfile> {
        self.skill.clone()
    }

    fn reward(&self) -> RewardSpec {
        self.reward
    }

    fn gain_exp(&self, amount: u32) {
        let _ = self
            .exp
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |exp| {
                Some(exp.saturating_add(amount))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(hp: u32, max_hp: Option<u32>) -> CombatantSpec {
        CombatantSpec {
            name: "Knight".into(),
            monster: false,
            hp,
            max_hp,
            atk: 5,
            def: 2,
            speed: 4,
            skill: None,
            reward: RewardSpec::default(),
        }
    }

    #[test]
    fn hp_is_clamped_to_max() {
        let sheet = CombatantSheet::from_spec(&spec(30, Some(20)));
        assert_eq!(sheet.hp(), 20);
        assert_eq!(sheet.max_hp(), 20);
    }

    #[test]
    fn damage_saturates_and_exp_accumulates() {
        let sheet = CombatantSheet::from_spec(&spec(10, None));
        sheet.take_damage(4);
        assert_eq!(sheet.hp(), 6);
        sheet.take_damage(50);
        assert_eq!(sheet.hp(), 0);
        assert!(!sheet.is_alive());

        sheet.gain_exp(12);
        sheet.gain_exp(8);
        assert_eq!(sheet.exp(), 20);
    }
}
