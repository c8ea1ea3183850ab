//! Proc evaluation
//!
//! Combat events trigger auras whose proc flags match, consuming a charge per
//! trigger. The host is either the *receiver* of the event (it was hit, or
//! someone else cast at it) or the *actor*; the other unit becomes the
//! proc's effect target.

use bevy::log::debug;

use super::constants::UNLIMITED_PROC_CHARGES;
use super::flags::ProcFlags;
use super::host::{AuraContext, UnitId};
use super::manager::AuraManager;
use super::spell::CastRef;

/// One damage instance between two units.
#[derive(Clone, Debug)]
pub struct DamageInfo {
    pub attacker: UnitId,
    pub target: UnitId,
    pub total_damage: u32,
    /// Victim-side outcome flags (dodge, parry, block)
    pub proc_victim: ProcFlags,
}

/// A combat event offered to the unit's procs.
#[derive(Clone, Debug, Default)]
pub struct AuraProcEvent {
    pub involved_cast: Option<CastRef>,
    pub killed_unit: bool,
    pub damage_info: Option<DamageInfo>,
    pub is_melee_swing: bool,
}

impl AuraProcEvent {
    /// `true` if `unit` is on the receiving end of this event.
    pub fn is_receiver(&self, unit: UnitId) -> bool {
        self.damage_info.as_ref().is_some_and(|damage| damage.target == unit)
            || self.involved_cast.as_ref().is_some_and(|cast| cast.caster != unit)
    }

    /// The other unit of the interaction, passed to the proc as its target.
    pub fn effect_target(&self, unit: UnitId) -> UnitId {
        let is_receiver = self.is_receiver(unit);
        if let Some(damage) = &self.damage_info {
            if is_receiver {
                damage.attacker
            } else {
                damage.target
            }
        } else if let Some(cast) = &self.involved_cast {
            if is_receiver {
                cast.caster
            } else {
                cast.initial_target.unwrap_or(unit)
            }
        } else {
            unit
        }
    }
}

pub type ProcConditions = [(ProcFlags, bool); 10];

/// Evaluation order matters: it is the order charges are consumed in.
pub fn proc_conditions(unit: UnitId, event: &AuraProcEvent) -> ProcConditions {
    let is_receiver = event.is_receiver(unit);
    let dealt_or_took = event
        .damage_info
        .as_ref()
        .is_some_and(|damage| damage.total_damage > 0);
    let victim = event
        .damage_info
        .as_ref()
        .map_or(ProcFlags::NONE, |damage| damage.proc_victim);
    let has_cast = event.involved_cast.is_some();

    [
        (ProcFlags::DEAL_COMBAT_DMG, !is_receiver && dealt_or_took),
        (ProcFlags::TAKE_COMBAT_DMG, is_receiver && dealt_or_took),
        (ProcFlags::KILL, event.killed_unit),
        // Heartbeat procs run on the periodic tick path
        (ProcFlags::HEARTBEAT, false),
        (ProcFlags::DODGE, is_receiver && victim.intersects(ProcFlags::DODGE)),
        (ProcFlags::PARRY, is_receiver && victim.intersects(ProcFlags::PARRY)),
        (ProcFlags::BLOCK, is_receiver && victim.intersects(ProcFlags::BLOCK)),
        (ProcFlags::SWING, !is_receiver && event.is_melee_swing),
        (ProcFlags::SPELL_CAST, !is_receiver && has_cast),
        (ProcFlags::SPELL_HIT, is_receiver && has_cast),
    ]
}

impl AuraManager {
    /// Trigger every aura whose proc flags match `event`.
    pub fn check_aura_procs(&mut self, ctx: &mut AuraContext, event: &AuraProcEvent) {
        let unit = ctx.host.unit_id();
        let conditions = proc_conditions(unit, event);
        let effect_target = event.effect_target(unit);

        for key in self.registry.snapshot() {
            for (flag, condition) in conditions {
                let Some(aura) = self.registry.get_by_key_mut(key) else {
                    break;
                };
                if aura.proc_flags.is_empty() {
                    break;
                }
                if !condition || !aura.proc_flags.intersects(flag) || aura.proc_charges == 0 {
                    continue;
                }

                // Spend the charge before triggering so the handler's own
                // side effects cannot proc this aura again.
                if aura.proc_charges != UNLIMITED_PROC_CHARGES {
                    aura.proc_charges -= 1;
                }
                let exhausted = aura.proc_charges == 0;

                debug!(
                    "Aura {} procced on {:?} ({} charges left)",
                    aura.spell_id, flag, aura.proc_charges
                );
                ctx.effects.proc(aura, effect_target);

                if exhausted {
                    self.remove_aura(ctx, key, false);
                    break;
                }
            }
        }
    }
}
