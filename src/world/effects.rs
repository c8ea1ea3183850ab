//! Effect handler for the ECS world
//!
//! Stat math is out of scope here; the handler toggles the unit state auras
//! own directly (mounted) and records every transition in the `AuraLog`.

use bevy::prelude::Resource;
use std::collections::HashSet;

use crate::aura::{AppliedAura, AuraHost, AuraType, EffectHandler, UnitId};

use super::log::{AuraLog, AuraLogEventType};

/// Instances currently live, keyed by (target, aura instance id). Lets the
/// handler tell a first application from a refresh.
#[derive(Resource, Default)]
pub struct LiveAuras(HashSet<(UnitId, u64)>);

/// Borrowed per system run; one handler serves every unit.
pub struct LoggingEffects<'a> {
    pub log: &'a mut AuraLog,
    pub live: &'a mut LiveAuras,
}

impl<'a> LoggingEffects<'a> {
    pub fn new(log: &'a mut AuraLog, live: &'a mut LiveAuras) -> Self {
        Self { log, live }
    }
}

fn describe(aura: &AppliedAura) -> String {
    if aura.spell.subtext.is_empty() {
        aura.spell.name.clone()
    } else {
        format!("{} ({})", aura.spell.name, aura.spell.subtext)
    }
}

impl EffectHandler for LoggingEffects<'_> {
    fn apply(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost) {
        if aura.aura_type == AuraType::Mounted {
            target.set_mounted(true);
        }

        let slot = aura.slot.map(|s| s.0);
        if self.live.0.insert((aura.target, aura.id.0)) {
            self.log.log(
                AuraLogEventType::Applied,
                aura.target,
                Some(aura.spell_id),
                slot,
                format!("{} applied", describe(aura)),
            );
        } else {
            self.log.log(
                AuraLogEventType::Refreshed,
                aura.target,
                Some(aura.spell_id),
                slot,
                format!("{} refreshed ({} stacks)", describe(aura), aura.applied_stacks),
            );
        }
    }

    fn remove(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost) {
        if aura.aura_type == AuraType::Mounted {
            target.set_mounted(false);
        }

        self.live.0.remove(&(aura.target, aura.id.0));
        self.log.log(
            AuraLogEventType::Removed,
            aura.target,
            Some(aura.spell_id),
            aura.slot.map(|s| s.0),
            format!("{} faded", describe(aura)),
        );
    }

    fn proc(&mut self, aura: &AppliedAura, effect_target: UnitId) {
        let charges = if aura.proc_charges < 0 {
            "unlimited".to_string()
        } else {
            aura.proc_charges.to_string()
        };
        self.log.log(
            AuraLogEventType::Proc,
            aura.target,
            Some(aura.spell_id),
            aura.slot.map(|s| s.0),
            format!(
                "{} triggered against unit {} ({} charges left)",
                describe(aura),
                effect_target.0,
                charges
            ),
        );
    }

    fn periodic_tick(&mut self, aura: &AppliedAura, _target: &mut dyn AuraHost) {
        let amount = aura
            .spell
            .effect(usize::from(aura.effect_index))
            .map_or(0, |effect| effect.base_points);
        self.log.log(
            AuraLogEventType::Periodic,
            aura.target,
            Some(aura.spell_id),
            aura.slot.map(|s| s.0),
            format!("{} ticks for {}", describe(aura), amount),
        );
    }

    fn dismount(&mut self, target: &mut dyn AuraHost) {
        target.set_mounted(false);
        self.log.log(
            AuraLogEventType::Dismounted,
            target.unit_id(),
            None,
            None,
            "Dismounted".to_string(),
        );
    }
}
