//! Seeded sweeps over generated rosters. Every battle is driven inline, so
//! each command runs the battle forward to the next player decision.

mod common;

use battle_core::{
    BattleConfig, BattleEvent, BattleOutcome, Battler, BattlerId, BattlerRegistry, BattlerStats,
    CommandError, RollStream, SkillCategory, SkillProfile, StatusEffectInstance,
};
use battle_core::combat::calculate_damage;
use common::Harness;

const SEEDS: u64 = 64;
const MAX_COMMANDS: usize = 400;

fn roll(rolls: &mut RollStream, low: u32, high: u32) -> u32 {
    let span = (high - low + 1) as usize;
    low + rolls.pick_index(span).unwrap_or(0) as u32
}

fn roster(seed: u64) -> Vec<Battler> {
    let mut rolls = RollStream::seeded(seed);
    let players = roll(&mut rolls, 1, 3);
    let monsters = roll(&mut rolls, 1, 4);
    let mut battlers = Vec::new();

    for n in 0..players + monsters {
        let id = BattlerId(n);
        let hp = roll(&mut rolls, 8, 40);
        let stats = BattlerStats::new(
            hp,
            hp,
            roll(&mut rolls, 1, 12),
            roll(&mut rolls, 0, 6),
            roll(&mut rolls, 1, 4),
        );
        let battler = if n < players {
            let skill = if rolls.chance(50) {
                SkillProfile::new("Flurry", SkillCategory::TargetedEffect, roll(&mut rolls, 2, 9))
                    .with_effect(StatusEffectInstance::stun(1), 40)
                    .with_max_targets(2)
                    .with_cooldown(2)
            } else {
                SkillProfile::new("Rend", SkillCategory::AreaOfEffect, roll(&mut rolls, 1, 5))
                    .with_effect(StatusEffectInstance::bleed(2, 3), 60)
                    .with_cooldown(3)
            };
            Battler::player(id, format!("P{n}"), stats).with_skill(skill)
        } else {
            Battler::monster(id, format!("M{n}"), stats)
        };
        battlers.push(battler);
    }
    battlers
}

/// Plays one battle, checking invariants at every player decision.
fn play(seed: u64) -> (Option<BattleOutcome>, Vec<BattleEvent>) {
    let mut h = Harness::inline(roster(seed), BattleConfig::default()).started();
    let mut choices = RollStream::seeded(seed ^ 0x5eed);

    for _ in 0..MAX_COMMANDS {
        if h.engine.is_finished() {
            break;
        }
        let snapshot = h.engine.snapshot();
        for view in &snapshot.battlers {
            assert!(view.hp <= view.max_hp, "seed {seed}: {} over max hp", view.name);
            assert!(view.alive, "seed {seed}: {} dead but still listed", view.name);
        }
        let actor = snapshot
            .awaiting_player()
            .unwrap_or_else(|| panic!("seed {seed}: stalled in {:?}", snapshot.phase))
            .id;
        assert!(h.engine.ensure_current_turn(actor).is_ok());

        h.clock.advance_ms(300);
        let result = match choices.pick_index(4) {
            Some(0) => h.engine.issue_strong_attack().map(drop),
            Some(1) => h.engine.issue_skill().map(drop),
            Some(2) => h.engine.issue_end_turn(),
            _ => h.engine.issue_normal_attack().map(drop),
        };
        match result {
            Ok(()) => {}
            Err(CommandError::SkillNotReady { .. }) => {
                h.engine.issue_normal_attack().unwrap();
            }
            Err(err) => panic!("seed {seed}: unexpected rejection {err}"),
        }
    }

    (h.engine.outcome().cloned(), h.log.events())
}

#[test]
fn generated_battles_finish_with_consistent_outcomes() {
    for seed in 0..SEEDS {
        let (outcome, events) = play(seed);
        let outcome = outcome.unwrap_or_else(|| panic!("seed {seed}: battle never ended"));

        match &outcome {
            BattleOutcome::Victory(report) => {
                let granted: u32 = report.grants.iter().map(|grant| grant.amount).sum();
                assert_eq!(granted, report.total_exp, "seed {seed}");
            }
            BattleOutcome::Defeat => {}
            other => panic!("seed {seed}: unexpected outcome {other:?}"),
        }
        assert_eq!(
            events.last(),
            Some(&BattleEvent::BattleEnded { outcome }),
            "seed {seed}"
        );
    }
}

#[test]
fn same_seed_replays_identically() {
    for seed in [3, 17, 42] {
        assert_eq!(play(seed), play(seed));
    }
}

#[test]
fn rounds_only_move_forward() {
    for seed in 0..SEEDS {
        let (_, events) = play(seed);
        let rounds: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::RoundStarted { round } => Some(*round),
                _ => None,
            })
            .collect();
        let expected: Vec<u32> = (1..=rounds.len() as u32).collect();
        assert_eq!(rounds, expected, "seed {seed}");
    }
}

#[test]
fn turn_order_ignores_input_order() {
    for seed in 0..SEEDS {
        let battlers = roster(seed);
        let mut reversed = battlers.clone();
        reversed.reverse();

        let order = BattlerRegistry::from_battlers(battlers).turn_order();
        assert_eq!(
            BattlerRegistry::from_battlers(reversed).turn_order(),
            order,
            "seed {seed}"
        );

        let registry = BattlerRegistry::from_battlers(roster(seed));
        let speeds: Vec<u32> = registry.iter().map(|battler| battler.speed).collect();
        assert!(speeds.windows(2).all(|pair| pair[0] >= pair[1]), "seed {seed}");
    }
}

#[test]
fn damage_never_drops_below_floor() {
    let mut rolls = RollStream::seeded(99);
    for _ in 0..500 {
        let raw = roll(&mut rolls, 0, 50);
        let defense = roll(&mut rolls, 0, 50);
        let minimum = roll(&mut rolls, 1, 3);
        let dealt = calculate_damage(raw, defense, minimum);
        assert!(dealt >= minimum && dealt >= 1);
        assert_eq!(dealt, raw.saturating_sub(defense).max(minimum));
    }
}
