use crate::state::StatusEffectInstance;

/// How a skill picks its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillCategory {
    /// Hits every living enemy.
    AreaOfEffect,
    /// Hits up to `max_targets` randomly chosen living enemies.
    TargetedEffect,
}

/// Equipped skill/weapon data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillProfile {
    pub name: String,
    pub category: SkillCategory,
    /// Raw damage per hit, before the target's defense.
    pub damage: u32,
    /// Percent chance per hit to attach `effect`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub apply_chance: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<StatusEffectInstance>,
    /// Target cap for `TargetedEffect`. Treated as at least 1.
    #[cfg_attr(feature = "serde", serde(default = "default_max_targets"))]
    pub max_targets: u32,
    /// Turns before the skill can be used again.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_turns: u32,
}

#[cfg(feature = "serde")]
fn default_max_targets() -> u32 {
    1
}

impl SkillProfile {
    pub fn new(name: impl Into<String>, category: SkillCategory, damage: u32) -> Self {
        Self {
            name: name.into(),
            category,
            damage,
            apply_chance: 0,
            effect: None,
            max_targets: 1,
            cooldown_turns: 0,
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: StatusEffectInstance, apply_chance: u8) -> Self {
        self.effect = Some(effect);
        self.apply_chance = apply_chance;
        self
    }

    #[must_use]
    pub fn with_max_targets(mut self, max_targets: u32) -> Self {
        self.max_targets = max_targets;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown_turns: u32) -> Self {
        self.cooldown_turns = cooldown_turns;
        self
    }
}
