use crate::state::BattlerId;

/// Anything that can receive damage from the Combat Resolver.
pub trait Damageable {
    fn id(&self) -> BattlerId;
    fn defense(&self) -> u32;
    fn current_hp(&self) -> u32;
    /// False for dead targets and targets whose backing object is gone.
    fn can_take_damage(&self) -> bool;
    /// Reduces hp by `amount` (saturating) and returns hp afterwards.
    fn take_damage(&mut self, amount: u32) -> u32;
}

/// Result of one damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedDamage {
    pub target: BattlerId,
    /// Post-mitigation damage. `0` only for a no-op against an invalid target.
    pub dealt: u32,
    pub hp_after: u32,
    pub target_died: bool,
}

impl AppliedDamage {
    pub(crate) const fn none(target: BattlerId, hp: u32) -> Self {
        Self {
            target,
            dealt: 0,
            hp_after: hp,
            target_died: false,
        }
    }
}

/// Damage after defense, never below `minimum` and never below 1.
pub const fn calculate_damage(raw: u32, defense: u32, minimum: u32) -> u32 {
    let minimum = if minimum == 0 { 1 } else { minimum };
    let mitigated = raw.saturating_sub(defense);
    if mitigated < minimum {
        minimum
    } else {
        mitigated
    }
}

/// Applies `raw` damage to `target`. Dead or removed targets are left
/// untouched and yield `dealt == 0`.
pub fn apply_damage<T: Damageable + ?Sized>(target: &mut T, raw: u32, minimum: u32) -> AppliedDamage {
    if !target.can_take_damage() {
        return AppliedDamage::none(target.id(), target.current_hp());
    }
    let dealt = calculate_damage(raw, target.defense(), minimum);
    let hp_after = target.take_damage(dealt);
    AppliedDamage {
        target: target.id(),
        dealt,
        hp_after,
        target_died: hp_after == 0,
    }
}
