use std::fs;
use std::sync::Arc;

use battle_content::ContentFactory;
use battle_core::{
    BattleConfig, BattleContext, BattleEngine, BattleOutcome, EventLog, ManualClock, NoActors,
    StatSource,
};
use tempfile::TempDir;

#[test]
fn bundled_content_loads() {
    let factory = ContentFactory::bundled();
    let config = factory.load_config().unwrap();
    let roster = factory.load_roster().unwrap();

    assert_eq!(config.monster_turn_delay_ms, 300);
    assert_eq!(roster.len(), 5);
    assert!(roster.registry().diagnostics().is_empty());
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ContentFactory::new(dir.path()).load_config().unwrap();
    assert_eq!(config, BattleConfig::default());
}

#[test]
fn missing_roster_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ContentFactory::new(dir.path()).load_roster().unwrap_err();
    assert!(err.to_string().contains("roster.ron"));
}

#[test]
fn loaded_roster_plays_a_battle_and_keeps_results() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(ContentFactory::ROSTER_FILE),
        r#"[
            (name: "Hero", hp: 40, atk: 10, def: 2, speed: 5),
            (name: "Rat", monster: true, hp: 6, atk: 3, def: 0, speed: 3,
             reward: (exp_value: 9, rarity_or_slot: 0)),
        ]"#,
    )
    .unwrap();
    fs::write(dir.path().join(ContentFactory::CONFIG_FILE), "minimum_damage = 2\n").unwrap();

    let factory = ContentFactory::new(dir.path());
    let config = factory.load_config().unwrap();
    let roster = factory.load_roster().unwrap();

    let ctx = BattleContext::new(config, Arc::new(ManualClock::new()), 11);
    let mut engine = BattleEngine::new(
        ctx,
        roster.registry(),
        Box::new(NoActors),
        Arc::new(EventLog::new()),
    );
    engine.start();
    engine.issue_normal_attack().unwrap();

    assert!(engine.outcome().is_some_and(BattleOutcome::is_victory));
    let hero = &roster.sheets()[0];
    let rat = &roster.sheets()[1];
    assert_eq!(rat.hp(), 0);
    assert_eq!(hero.exp(), 9);
}
