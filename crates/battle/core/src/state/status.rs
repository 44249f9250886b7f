//! Status effect instances attached to a battler.
//!
//! A battler carries at most one instance per [`StatusEffectKind`], stored in
//! insertion order. The StatusEffect Engine ([`crate::status::StatusEngine`])
//! is the only code that mutates durations.
use arrayvec::ArrayVec;

use crate::config::BattleConfig;

/// Status effect kinds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEffectKind {
    /// Fixed damage at the start of each turn.
    Bleed,
    /// The battler loses its action while active.
    Stun,
}

/// Kind-specific data. The kind of an instance is derived from this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusPayload {
    Bleed { damage_per_turn: u32 },
    Stun,
}

impl StatusPayload {
    pub const fn kind(&self) -> StatusEffectKind {
        match self {
            Self::Bleed { .. } => StatusEffectKind::Bleed,
            Self::Stun => StatusEffectKind::Stun,
        }
    }
}

/// A timed effect on one battler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectInstance {
    pub payload: StatusPayload,
    pub remaining_turns: u32,
    /// Re-applying the same kind resets `remaining_turns` instead of being ignored.
    #[cfg_attr(feature = "serde", serde(default = "default_refresh"))]
    pub refresh_if_exists: bool,
}

#[cfg(feature = "serde")]
fn default_refresh() -> bool {
    true
}

impl StatusEffectInstance {
    pub const fn new(payload: StatusPayload, remaining_turns: u32) -> Self {
        Self {
            payload,
            remaining_turns,
            refresh_if_exists: true,
        }
    }

    pub const fn bleed(damage_per_turn: u32, remaining_turns: u32) -> Self {
        Self::new(StatusPayload::Bleed { damage_per_turn }, remaining_turns)
    }

    pub const fn stun(remaining_turns: u32) -> Self {
        Self::new(StatusPayload::Stun, remaining_turns)
    }

    #[must_use]
    pub const fn with_refresh(mut self, refresh_if_exists: bool) -> Self {
        self.refresh_if_exists = refresh_if_exists;
        self
    }

    pub const fn kind(&self) -> StatusEffectKind {
        self.payload.kind()
    }

    pub const fn is_expired(&self) -> bool {
        self.remaining_turns == 0
    }
}

/// Ordered, non-stacking set of active status effects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffectInstance, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind() == kind)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffectInstance> {
        self.effects.iter().find(|effect| effect.kind() == kind)
    }

    pub fn remaining_turns(&self, kind: StatusEffectKind) -> Option<u32> {
        self.get(kind).map(|effect| effect.remaining_turns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectInstance> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.effects.is_full()
    }

    pub(crate) fn get_mut(&mut self, kind: StatusEffectKind) -> Option<&mut StatusEffectInstance> {
        self.effects.iter_mut().find(|effect| effect.kind() == kind)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffectInstance> {
        self.effects.iter_mut()
    }

    /// Appends a new instance. Returns false when the list is full.
    pub(crate) fn push(&mut self, effect: StatusEffectInstance) -> bool {
        self.effects.try_push(effect).is_ok()
    }

    pub(crate) fn remove_expired(&mut self) {
        self.effects.retain(|effect| !effect.is_expired());
    }

    pub(crate) fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload() {
        assert_eq!(
            StatusEffectInstance::bleed(3, 2).kind(),
            StatusEffectKind::Bleed
        );
        assert_eq!(StatusEffectInstance::stun(1).kind(), StatusEffectKind::Stun);
        assert_eq!(StatusEffectKind::Bleed.to_string(), "bleed");
    }

    #[test]
    fn push_respects_capacity() {
        let mut effects = StatusEffects::empty();
        for _ in 0..BattleConfig::MAX_STATUS_EFFECTS {
            assert!(effects.push(StatusEffectInstance::stun(1)));
        }
        assert!(effects.is_full());
        assert!(!effects.push(StatusEffectInstance::stun(1)));
    }
}
