//! Battle tuning loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleConfig`] from TOML files.
///
/// Missing keys keep their defaults, so an empty file yields
/// `BattleConfig::default()`.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)?;
        if config.strong_attack_multiplier == 0 {
            anyhow::bail!("strong_attack_multiplier must be at least 1");
        }
        if config.minimum_damage == 0 {
            anyhow::bail!("minimum_damage must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            monster_turn_delay_ms = 400
            minimum_damage = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.monster_turn_delay_ms, 400);
        assert_eq!(config.minimum_damage, 2);
        assert_eq!(
            config.end_turn_debounce_ms,
            BattleConfig::DEFAULT_END_TURN_DEBOUNCE_MS
        );
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        assert!(ConfigLoader::parse("strong_attack_multiplier = 0").is_err());
    }

    #[test]
    fn zero_minimum_damage_is_rejected() {
        assert!(ConfigLoader::parse("minimum_damage = 0").is_err());
    }

    #[test]
    fn unknown_types_fail() {
        assert!(ConfigLoader::parse("action_timeout_ms = \"soon\"").is_err());
    }
}
