use crate::combat::SkillProfile;
use crate::state::RewardSpec;

/// Externally owned combatant stats.
///
/// The registry snapshots a source into a [`crate::Battler`] at battle start
/// and keeps a weak link to it. Damage is forwarded through
/// [`take_damage`](Self::take_damage) and EXP grants through
/// [`gain_exp`](Self::gain_exp); dropping the source removes the battler.
pub trait StatSource: Send + Sync {
    fn name(&self) -> &str;
    fn is_monster(&self) -> bool;
    fn hp(&self) -> u32;
    fn max_hp(&self) -> u32;
    fn atk(&self) -> u32;
    fn def(&self) -> u32;
    fn speed(&self) -> u32;

    /// Called with the post-mitigation amount for every hit.
    fn take_damage(&self, amount: u32);

    fn skill(&self) -> Option<SkillProfile> {
        None
    }

    fn reward(&self) -> RewardSpec {
        RewardSpec::default()
    }

    fn gain_exp(&self, _amount: u32) {}
}
