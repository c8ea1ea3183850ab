//! Interrupt evaluation
//!
//! On qualifying game events, every active aura whose interrupt flags match a
//! currently true condition is removed. The conditions form a fixed, ordered
//! table rebuilt on each call; per-aura special cases adjust a copy of that
//! table before it is matched.

use bevy::log::debug;

use super::flags::InterruptFlags;
use super::host::{AuraContext, AuraHost, StandState};
use super::manager::AuraManager;
use super::spell::{AuraType, CastRef};

/// Events asserted by the caller for one interrupt pass.
#[derive(Clone, Debug, Default)]
pub struct AuraInterruptEvent {
    pub moved: bool,
    pub turned: bool,
    pub changed_stand_state: bool,
    pub negative_aura_applied: bool,
    pub received_damage: bool,
    /// A spell the unit is about to cast
    pub cast: Option<CastRef>,
}

pub type InterruptConditions = [(InterruptFlags, bool); 9];

/// Evaluation order matters: it is the order removals happen in.
pub fn interrupt_conditions(host: &dyn AuraHost, event: &AuraInterruptEvent) -> InterruptConditions {
    let on_water = host.is_on_water();
    [
        (InterruptFlags::ENTER_COMBAT, host.in_combat()),
        (InterruptFlags::NOT_MOUNTED, host.is_mounted()),
        (InterruptFlags::MOVE, event.moved),
        (InterruptFlags::TURNING, event.turned),
        (InterruptFlags::CAST, event.cast.is_some()),
        (InterruptFlags::NEGATIVE_SPELL, event.negative_aura_applied),
        (InterruptFlags::DAMAGE, event.received_damage),
        (InterruptFlags::NOT_ABOVEWATER, on_water),
        (InterruptFlags::NOT_UNDERWATER, !on_water),
    ]
}

fn mask(conditions: &mut InterruptConditions, flag: InterruptFlags) {
    for (candidate, condition) in conditions.iter_mut() {
        if *candidate == flag {
            *condition = false;
        }
    }
}

impl AuraManager {
    /// Remove every aura interrupted by `event`.
    pub fn check_aura_interrupts(&mut self, ctx: &mut AuraContext, event: &AuraInterruptEvent) {
        let conditions = interrupt_conditions(&*ctx.host, event);
        let stood_up = event.changed_stand_state && ctx.host.stand_state() != StandState::Sit;
        let stealth_safe_cast = event
            .cast
            .as_ref()
            .is_some_and(|cast| !ctx.catalog.cast_breaks_stealth(cast));

        for key in self.registry.snapshot() {
            let Some(aura) = self.registry.get_by_key(key) else {
                continue;
            };

            // Food and drink carry no interrupt flag for standing up
            if stood_up && ctx.catalog.is_refreshment_spell(&aura.spell) {
                debug!("Refreshment aura {} ended: unit stood up", aura.spell_id);
                self.remove_aura(ctx, key, false);
                continue;
            }

            let mut aura_conditions = conditions;
            if aura.aura_type == AuraType::ModStealth && stealth_safe_cast {
                mask(&mut aura_conditions, InterruptFlags::CAST);
            }

            let interrupt_flags = aura.interrupt_flags;
            // Keeps scanning after a removal; remove_aura ignores the repeats.
            for (flag, condition) in aura_conditions {
                if condition && interrupt_flags.intersects(flag) {
                    debug!("Aura in slot {} interrupted by {:?}", key.slot, flag);
                    self.remove_aura(ctx, key, false);
                }
            }
        }
    }
}
