//! StatusEffect Engine: applies and ticks timed effects on one battler.
//!
//! The engine never touches `hp`. [`StatusEngine::tick`] returns the damage
//! owed and the caller routes it through the Combat Resolver, so hp loss and
//! death detection have a single code path.
use tracing::{debug, warn};

use crate::event::{BattleEvent, EventSink, StatusChange};
use crate::state::{Battler, StatusEffectInstance, StatusEffectKind, StatusPayload};

/// What [`StatusEngine::apply`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Refreshed,
    Ignored,
}

/// Result of one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub total_damage: u32,
    /// Kinds that reached zero remaining turns, in insertion order.
    pub expired: Vec<StatusEffectKind>,
    /// Set when an active effect (Stun) takes away this turn's action.
    pub skip_action: Option<StatusEffectKind>,
}

pub struct StatusEngine;

impl StatusEngine {
    /// Attaches `effect` to `battler`.
    ///
    /// An existing instance of the same kind is refreshed to the new duration
    /// when `effect.refresh_if_exists` is set and left alone otherwise.
    /// Zero-duration effects, dead battlers and full effect lists are ignored.
    pub fn apply(
        battler: &mut Battler,
        effect: StatusEffectInstance,
        sink: &dyn EventSink,
    ) -> ApplyOutcome {
        let kind = effect.kind();
        if effect.is_expired() || !battler.is_alive() {
            return ApplyOutcome::Ignored;
        }

        if let Some(existing) = battler.statuses.get_mut(kind) {
            if !effect.refresh_if_exists {
                debug!(
                    target: "battle::status",
                    battler = %battler.id,
                    %kind,
                    "effect already active; re-apply ignored",
                );
                return ApplyOutcome::Ignored;
            }
            *existing = effect;
            sink.publish(BattleEvent::StatusChanged {
                battler: battler.id,
                kind,
                change: StatusChange::Refreshed,
            });
            return ApplyOutcome::Refreshed;
        }

        if !battler.statuses.push(effect) {
            warn!(
                target: "battle::status",
                battler = %battler.id,
                %kind,
                "status list full; effect dropped",
            );
            return ApplyOutcome::Ignored;
        }
        sink.publish(BattleEvent::StatusChanged {
            battler: battler.id,
            kind,
            change: StatusChange::Applied,
        });
        ApplyOutcome::Applied
    }

    /// Runs every active effect once, in insertion order, and drops the ones
    /// that expire.
    pub fn tick(battler: &mut Battler, sink: &dyn EventSink) -> TickReport {
        let mut report = TickReport::default();

        for effect in battler.statuses.iter_mut() {
            if effect.is_expired() {
                continue;
            }
            match effect.payload {
                StatusPayload::Bleed { damage_per_turn } => {
                    report.total_damage = report.total_damage.saturating_add(damage_per_turn);
                }
                StatusPayload::Stun => {
                    report.skip_action.get_or_insert(StatusEffectKind::Stun);
                }
            }
            effect.remaining_turns -= 1;
            if effect.is_expired() {
                report.expired.push(effect.kind());
            }
        }

        battler.statuses.remove_expired();
        for &kind in &report.expired {
            sink.publish(BattleEvent::StatusChanged {
                battler: battler.id,
                kind,
                change: StatusChange::Expired,
            });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::state::{BattlerId, BattlerStats};

    fn target() -> Battler {
        Battler::monster(BattlerId(1), "Goblin", BattlerStats::new(10, 10, 3, 2, 5))
    }

    #[test]
    fn reapply_with_refresh_keeps_one_instance() {
        let log = EventLog::new();
        let mut goblin = target();

        assert_eq!(
            StatusEngine::apply(&mut goblin, StatusEffectInstance::bleed(2, 3), &log),
            ApplyOutcome::Applied
        );
        assert_eq!(
            StatusEngine::apply(&mut goblin, StatusEffectInstance::bleed(2, 5), &log),
            ApplyOutcome::Refreshed
        );

        assert_eq!(goblin.statuses.len(), 1);
        assert_eq!(goblin.statuses.remaining_turns(StatusEffectKind::Bleed), Some(5));
        assert_eq!(
            log.status_changes(),
            vec![
                (BattlerId(1), StatusEffectKind::Bleed, StatusChange::Applied),
                (BattlerId(1), StatusEffectKind::Bleed, StatusChange::Refreshed),
            ]
        );
    }

    #[test]
    fn reapply_without_refresh_is_ignored() {
        let log = EventLog::new();
        let mut goblin = target();
        StatusEngine::apply(&mut goblin, StatusEffectInstance::stun(1), &log);

        let outcome = StatusEngine::apply(
            &mut goblin,
            StatusEffectInstance::stun(4).with_refresh(false),
            &log,
        );
        assert_eq!(outcome, ApplyOutcome::Ignored);
        assert_eq!(goblin.statuses.remaining_turns(StatusEffectKind::Stun), Some(1));
    }

    #[test]
    fn applied_effect_is_an_independent_copy() {
        let log = EventLog::new();
        let mut goblin = target();
        let mut template = StatusEffectInstance::bleed(4, 2);
        StatusEngine::apply(&mut goblin, template, &log);

        template.remaining_turns = 99;
        assert_eq!(goblin.statuses.remaining_turns(StatusEffectKind::Bleed), Some(2));
    }

    #[test]
    fn tick_accumulates_and_expires_in_order() {
        let log = EventLog::new();
        let mut goblin = target();
        StatusEngine::apply(&mut goblin, StatusEffectInstance::bleed(3, 1), &log);
        StatusEngine::apply(&mut goblin, StatusEffectInstance::stun(2), &log);

        let first = StatusEngine::tick(&mut goblin, &log);
        assert_eq!(first.total_damage, 3);
        assert_eq!(first.expired, vec![StatusEffectKind::Bleed]);
        assert_eq!(first.skip_action, Some(StatusEffectKind::Stun));
        assert!(!goblin.statuses.has(StatusEffectKind::Bleed));
        // the engine reports damage but never applies it
        assert_eq!(goblin.hp(), 10);

        let second = StatusEngine::tick(&mut goblin, &log);
        assert_eq!(second.total_damage, 0);
        assert_eq!(second.expired, vec![StatusEffectKind::Stun]);
        assert!(goblin.statuses.is_empty());

        let third = StatusEngine::tick(&mut goblin, &log);
        assert_eq!(third, TickReport::default());
    }

    #[test]
    fn zero_duration_and_dead_targets_are_ignored() {
        let log = EventLog::new();
        let mut goblin = target();
        assert_eq!(
            StatusEngine::apply(&mut goblin, StatusEffectInstance::bleed(1, 0), &log),
            ApplyOutcome::Ignored
        );

        let mut corpse =
            Battler::monster(BattlerId(2), "Corpse", BattlerStats::new(0, 5, 0, 0, 0));
        assert_eq!(
            StatusEngine::apply(&mut corpse, StatusEffectInstance::stun(2), &log),
            ApplyOutcome::Ignored
        );
        assert!(log.is_empty());
    }
}
