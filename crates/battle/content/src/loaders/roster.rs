//! Roster loader.
//!
//! RON format: a list of [`CombatantSpec`]. List position becomes the
//! battler id, so a roster file doubles as the slot layout of a battle.

use std::path::Path;
use std::sync::Arc;

use battle_core::{BattlerRegistry, RewardSpec, SkillProfile, StatSource};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};
use crate::sheet::CombatantSheet;

/// One roster entry as written in content files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub name: String,
    #[serde(default)]
    pub monster: bool,
    pub hp: u32,
    /// Defaults to `hp`.
    #[serde(default)]
    pub max_hp: Option<u32>,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
    #[serde(default)]
    pub skill: Option<SkillProfile>,
    #[serde(default)]
    pub reward: RewardSpec,
}

/// Loaded combatants, owned for the lifetime of one or more battles.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    sheets: Vec<Arc<CombatantSheet>>,
}

impl Roster {
    pub fn from_specs(specs: &[CombatantSpec]) -> Self {
        Self {
            sheets: specs
                .iter()
                .map(|spec| Arc::new(CombatantSheet::from_spec(spec)))
                .collect(),
        }
    }

    pub fn sheets(&self) -> &[Arc<CombatantSheet>] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Stat-source slots in roster order, ready for
    /// [`BattlerRegistry::build_turn_order`].
    pub fn sources(&self) -> Vec<Option<Arc<dyn StatSource>>> {
        self.sheets
            .iter()
            .map(|sheet| Some(Arc::clone(sheet) as Arc<dyn StatSource>))
            .collect()
    }

    /// Builds a registry linked to this roster. The roster must outlive the
    /// battle; dropping it removes every battler.
    pub fn registry(&self) -> BattlerRegistry {
        BattlerRegistry::build_turn_order(self.sources())
    }
}

/// Loader for rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load roster {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Roster> {
        let specs: Vec<CombatantSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        Self::validate(&specs)?;
        Ok(Roster::from_specs(&specs))
    }

    fn validate(specs: &[CombatantSpec]) -> LoadResult<()> {
        if specs.is_empty() {
            warn!(target: "battle::content", "roster is empty");
        }
        for (slot, spec) in specs.iter().enumerate() {
            if let Some(skill) = &spec.skill
                && skill.apply_chance > 100
            {
                anyhow::bail!(
                    "combatant '{}' (slot {}): apply_chance {} exceeds 100",
                    spec.name,
                    slot,
                    skill.apply_chance
                );
            }
            if spec.max_hp.unwrap_or(spec.hp) == 0 {
                // the registry skips these with a diagnostic
                warn!(
                    target: "battle::content",
                    slot,
                    name = %spec.name,
                    "combatant has max_hp 0",
                );
            }
        }
        if !specs.iter().any(|spec| spec.monster) || specs.iter().all(|spec| spec.monster) {
            warn!(target: "battle::content", "roster has only one side");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{SkillCategory, StatusEffectKind};

    use super::*;

    const ROSTER: &str = r#"
    [
        (
            name: "Knight",
            hp: 30,
            atk: 7,
            def: 3,
            speed: 6,
            skill: Some((
                name: "Sweep",
                category: AreaOfEffect,
                damage: 4,
                apply_chance: 50,
                effect: Some((payload: Bleed(damage_per_turn: 2), remaining_turns: 2)),
                cooldown_turns: 3,
            )),
        ),
        (
            name: "Goblin",
            monster: true,
            hp: 12,
            atk: 4,
            def: 1,
            speed: 5,
            reward: (exp_value: 25, rarity_or_slot: 1),
        ),
    ]
    "#;

    #[test]
    fn parses_specs_with_defaults() {
        let roster = RosterLoader::parse(ROSTER).unwrap();
        assert_eq!(roster.len(), 2);

        let knight = &roster.sheets()[0];
        assert!(!knight.is_monster());
        assert_eq!(knight.max_hp(), 30);
        let skill = knight.skill().unwrap();
        assert_eq!(skill.category, SkillCategory::AreaOfEffect);
        assert_eq!(skill.max_targets, 1);
        let effect = skill.effect.unwrap();
        assert_eq!(effect.kind(), StatusEffectKind::Bleed);
        assert!(effect.refresh_if_exists);

        let goblin = &roster.sheets()[1];
        assert!(goblin.is_monster());
        assert_eq!(goblin.reward().exp_value, 25);
    }

    #[test]
    fn registry_keeps_roster_slots_as_ids() {
        let roster = RosterLoader::parse(ROSTER).unwrap();
        let registry = roster.registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.diagnostics().is_empty());
        let goblin = registry.get_by_id(battle_core::BattlerId(1)).unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(goblin.reward.exp_value, 25);
    }

    #[test]
    fn rejects_out_of_range_chance() {
        let bad = r#"[(name: "X", hp: 1, atk: 1, def: 0, speed: 1,
            skill: Some((name: "Y", category: TargetedEffect, damage: 1, apply_chance: 101)))]"#;
        assert!(RosterLoader::parse(bad).is_err());
    }
}
