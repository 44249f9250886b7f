use std::time::Duration;

/// Battle tuning parameters and compile-time limits.
///
/// Every field has a default, so partial TOML files only need to name the
/// values they override.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Minimum interval between two accepted `end_turn` calls.
    pub end_turn_debounce_ms: u64,
    /// Minimum interval between two target changes.
    pub select_target_debounce_ms: u64,
    /// Delay before a monster starts its action. `0` starts it immediately.
    pub monster_turn_delay_ms: u64,
    /// Age after which a pending actor action is force-completed. `0` disables
    /// the watchdog.
    pub action_timeout_ms: u64,
    /// Number of consecutive watchdog timeouts that aborts the battle.
    pub max_action_timeouts: u32,
    /// Multiplier applied to `atk` by a strong attack.
    pub strong_attack_multiplier: u32,
    /// Floor for damage after defense mitigation. Values below 1 act as 1.
    pub minimum_damage: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_END_TURN_DEBOUNCE_MS: u64 = 250;
    pub const DEFAULT_SELECT_TARGET_DEBOUNCE_MS: u64 = 150;
    pub const DEFAULT_MONSTER_TURN_DELAY_MS: u64 = 0;
    pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_MAX_ACTION_TIMEOUTS: u32 = 3;
    pub const DEFAULT_STRONG_ATTACK_MULTIPLIER: u32 = 2;
    pub const DEFAULT_MINIMUM_DAMAGE: u32 = 1;

    pub fn new() -> Self {
        Self {
            end_turn_debounce_ms: Self::DEFAULT_END_TURN_DEBOUNCE_MS,
            select_target_debounce_ms: Self::DEFAULT_SELECT_TARGET_DEBOUNCE_MS,
            monster_turn_delay_ms: Self::DEFAULT_MONSTER_TURN_DELAY_MS,
            action_timeout_ms: Self::DEFAULT_ACTION_TIMEOUT_MS,
            max_action_timeouts: Self::DEFAULT_MAX_ACTION_TIMEOUTS,
            strong_attack_multiplier: Self::DEFAULT_STRONG_ATTACK_MULTIPLIER,
            minimum_damage: Self::DEFAULT_MINIMUM_DAMAGE,
        }
    }

    #[must_use]
    pub fn with_end_turn_debounce_ms(mut self, ms: u64) -> Self {
        self.end_turn_debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_select_target_debounce_ms(mut self, ms: u64) -> Self {
        self.select_target_debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_monster_turn_delay_ms(mut self, ms: u64) -> Self {
        self.monster_turn_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_action_timeout_ms(mut self, ms: u64) -> Self {
        self.action_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_action_timeouts(mut self, count: u32) -> Self {
        self.max_action_timeouts = count;
        self
    }

    #[must_use]
    pub fn with_strong_attack_multiplier(mut self, multiplier: u32) -> Self {
        self.strong_attack_multiplier = multiplier;
        self
    }

    pub fn end_turn_debounce(&self) -> Duration {
        Duration::from_millis(self.end_turn_debounce_ms)
    }

    pub fn select_target_debounce(&self) -> Duration {
        Duration::from_millis(self.select_target_debounce_ms)
    }

    pub fn monster_turn_delay(&self) -> Duration {
        Duration::from_millis(self.monster_turn_delay_ms)
    }

    /// Watchdog timeout, or `None` when disabled.
    pub fn action_timeout(&self) -> Option<Duration> {
        (self.action_timeout_ms > 0).then(|| Duration::from_millis(self.action_timeout_ms))
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
