use std::fmt;
use std::sync::{Arc, Weak};

use crate::combat::{Damageable, SkillProfile};
use crate::env::StatSource;

use super::{BattlerId, StatusEffects};

/// Combat stats copied from a stat source at roster-build time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlerStats {
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
}

impl BattlerStats {
    pub const fn new(hp: u32, max_hp: u32, atk: u32, def: u32, speed: u32) -> Self {
        Self {
            hp,
            max_hp,
            atk,
            def,
            speed,
        }
    }
}

/// What a monster yields when it is removed from the roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardSpec {
    pub exp_value: u32,
    pub rarity_or_slot: u32,
}

/// Where a battler's stats live.
#[derive(Clone, Default)]
pub enum Backing {
    /// Stats live only in the [`Battler`] record.
    #[default]
    Detached,
    /// An external object owns the stats. Damage is forwarded to it and a
    /// dropped source counts as a dead battler.
    Linked(Weak<dyn StatSource>),
}

impl Backing {
    pub fn is_gone(&self) -> bool {
        match self {
            Self::Detached => false,
            Self::Linked(source) => source.strong_count() == 0,
        }
    }

    pub fn upgrade(&self) -> Option<Arc<dyn StatSource>> {
        match self {
            Self::Detached => None,
            Self::Linked(source) => source.upgrade(),
        }
    }
}

impl fmt::Debug for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("Detached"),
            Self::Linked(_) if self.is_gone() => f.write_str("Linked(gone)"),
            Self::Linked(_) => f.write_str("Linked"),
        }
    }
}

/// Combat participant tracked by the registry.
#[derive(Clone, Debug)]
pub struct Battler {
    pub id: BattlerId,
    pub name: String,
    pub is_monster: bool,
    hp: u32,
    max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
    pub statuses: StatusEffects,
    pub skill_cooldown_remaining: u32,
    pub skill: Option<SkillProfile>,
    pub reward: RewardSpec,
    backing: Backing,
}

impl Battler {
    /// Creates a detached battler. `max_hp` is raised to at least 1 and `hp`
    /// is clamped into `0..=max_hp`.
    pub fn new(id: BattlerId, name: impl Into<String>, is_monster: bool, stats: BattlerStats) -> Self {
        let max_hp = stats.max_hp.max(1);
        Self {
            id,
            name: name.into(),
            is_monster,
            hp: stats.hp.min(max_hp),
            max_hp,
            atk: stats.atk,
            def: stats.def,
            speed: stats.speed,
            statuses: StatusEffects::empty(),
            skill_cooldown_remaining: 0,
            skill: None,
            reward: RewardSpec::default(),
            backing: Backing::Detached,
        }
    }

    pub fn player(id: BattlerId, name: impl Into<String>, stats: BattlerStats) -> Self {
        Self::new(id, name, false, stats)
    }

    pub fn monster(id: BattlerId, name: impl Into<String>, stats: BattlerStats) -> Self {
        Self::new(id, name, true, stats)
    }

    /// Snapshots a stat source into a linked battler.
    ///
    /// Returns `None` when the source reports `max_hp == 0`.
    pub fn from_source(id: BattlerId, source: &Arc<dyn StatSource>) -> Option<Self> {
        if source.max_hp() == 0 {
            return None;
        }
        let stats = BattlerStats::new(
            source.hp(),
            source.max_hp(),
            source.atk(),
            source.def(),
            source.speed(),
        );
        let mut battler = Self::new(id, source.name(), source.is_monster(), stats);
        battler.skill = source.skill();
        battler.reward = source.reward();
        battler.backing = Backing::Linked(Arc::downgrade(source));
        Some(battler)
    }

    #[must_use]
    pub fn with_skill(mut self, skill: SkillProfile) -> Self {
        self.skill = Some(skill);
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: RewardSpec) -> Self {
        self.reward = reward;
        self
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn backing(&self) -> &Backing {
        &self.backing
    }

    /// The linked stat source, if any and still alive.
    pub fn source(&self) -> Option<Arc<dyn StatSource>> {
        self.backing.upgrade()
    }

    pub fn is_backing_gone(&self) -> bool {
        self.backing.is_gone()
    }

    /// Alive and present: `hp > 0` and the backing object still exists.
    pub fn is_alive(&self) -> bool {
        self.hp > 0 && !self.backing.is_gone()
    }

    pub fn is_skill_ready(&self) -> bool {
        self.skill.is_some() && self.skill_cooldown_remaining == 0
    }

    /// Removes lingering effects once the battler leaves the roster.
    pub(crate) fn clear_statuses(&mut self) {
        self.statuses.clear();
    }
}

impl Damageable for Battler {
    fn id(&self) -> BattlerId {
        self.id
    }

    fn defense(&self) -> u32 {
        self.def
    }

    fn current_hp(&self) -> u32 {
        self.hp
    }

    fn can_take_damage(&self) -> bool {
        self.is_alive()
    }

    fn take_damage(&mut self, amount: u32) -> u32 {
        self.hp = self.hp.saturating_sub(amount);
        if let Some(source) = self.backing.upgrade() {
            source.take_damage(amount);
        }
        self.hp
    }
}
