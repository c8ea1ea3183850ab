//! Aura systems
//!
//! Each system drains one event type and runs the matching manager
//! operation on the units involved. Units are processed one at a time; a
//! manager call only ever touches its own unit.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::aura::{
    AuraContext, AuraInterruptEvent, AuraManager, AuraProcEvent, CasterRef, CastRef, DamageInfo,
    SpellEffectType, SpellId, SpellInfo, StandState,
};

use super::effects::{LiveAuras, LoggingEffects};
use super::events::{
    ApplyAuraRequest, AuraInterruptRequest, AuraProcRequest, CancelAuraRequest, CastSpellRequest,
    DispelByCasterRequest, StandStateChanged, UnitDamageEvent, UnitDiedEvent,
};
use super::log::{AuraLog, AuraLogEventType};
use super::spell_book::SpellBook;
use super::unit::{unit_id, Unit};

/// Everything a system needs to run manager operations on units.
#[derive(SystemParam)]
pub struct AuraWorld<'w, 's> {
    pub units: Query<'w, 's, (&'static mut AuraManager, &'static mut Unit)>,
    pub spell_book: Res<'w, SpellBook>,
    pub log: ResMut<'w, AuraLog>,
    pub live: ResMut<'w, LiveAuras>,
}

impl AuraWorld<'_, '_> {
    /// Run `f` against one unit's manager. `None` if the entity is not a unit.
    pub fn with_unit<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut AuraManager, &mut AuraContext<'_>) -> R,
    ) -> Option<R> {
        let Ok((mut manager, mut unit)) = self.units.get_mut(entity) else {
            warn!("Aura request for {:?}, which is not a unit", entity);
            return None;
        };
        let mut effects = LoggingEffects::new(&mut *self.log, &mut *self.live);
        let mut ctx = AuraContext::new(&mut *unit, &mut effects, &*self.spell_book);
        Some(f(&mut *manager, &mut ctx))
    }

    pub fn caster_ref(&self, entity: Entity) -> Option<CasterRef> {
        self.units.get(entity).ok().map(|(_, unit)| unit.caster_ref())
    }

    pub fn spell(&self, spell_id: SpellId) -> Option<Arc<SpellInfo>> {
        let spell = self.spell_book.get(spell_id).cloned();
        if spell.is_none() {
            warn!("Unknown spell {}", spell_id);
        }
        spell
    }
}

/// Keep the log clock in step with the simulation.
pub fn update_log_time(time: Res<Time>, mut log: ResMut<AuraLog>) {
    log.sim_time += time.delta_secs();
}

/// Advance durations and periodic timers. Sub-millisecond remainders carry
/// over to the next frame.
pub fn tick_auras(time: Res<Time>, mut carry: Local<Duration>, mut world: AuraWorld) {
    *carry += time.delta();
    let elapsed_ms = carry.as_millis().min(u128::from(u32::MAX)) as u32;
    if elapsed_ms == 0 {
        return;
    }
    *carry -= Duration::from_millis(u64::from(elapsed_ms));

    let AuraWorld {
        units,
        spell_book,
        log,
        live,
    } = &mut world;
    for (mut manager, mut unit) in units.iter_mut() {
        let mut effects = LoggingEffects::new(&mut **log, &mut **live);
        let mut ctx = AuraContext::new(&mut *unit, &mut effects, &**spell_book);
        manager.update(&mut ctx, elapsed_ms);
    }
}

pub fn process_apply_requests(mut requests: EventReader<ApplyAuraRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        let (Some(spell), Some(caster)) = (world.spell(request.spell_id), world.caster_ref(request.caster)) else {
            continue;
        };
        apply_aura_effects(&mut world, request.target, caster, &spell);
    }
}

fn apply_aura_effects(world: &mut AuraWorld, target: Entity, caster: CasterRef, spell: &Arc<SpellInfo>) {
    for (index, effect) in spell.effects.iter().enumerate() {
        if effect.effect_type != SpellEffectType::ApplyAura {
            continue;
        }
        world.with_unit(target, |manager, ctx| {
            manager.apply_spell_effect_aura(ctx, caster, Arc::clone(spell), index)
        });
    }
}

pub fn process_cast_requests(mut requests: EventReader<CastSpellRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        let (Some(spell), Some(caster)) = (world.spell(request.spell_id), world.caster_ref(request.caster)) else {
            continue;
        };
        let target_id = unit_id(request.target);

        let applicable = world.units.get(request.target).is_ok_and(|(manager, _)| {
            manager.are_spell_effects_applicable(&*world.spell_book, caster, &spell, target_id)
        });
        if !applicable {
            world.log.log(
                AuraLogEventType::CastVetoed,
                target_id,
                Some(spell.id),
                None,
                format!("{} cannot land", spell.name),
            );
            continue;
        }

        let cast = CastRef::new(Arc::clone(&spell), caster.id, Some(target_id));

        // Casting breaks the caster's own cast-interruptible auras
        let interrupt = AuraInterruptEvent {
            cast: Some(cast.clone()),
            ..Default::default()
        };
        world.with_unit(request.caster, |manager, ctx| {
            manager.check_aura_interrupts(ctx, &interrupt)
        });

        apply_aura_effects(&mut world, request.target, caster, &spell);
        if spell
            .effects
            .iter()
            .any(|effect| effect.effect_type == SpellEffectType::SummonMount)
        {
            if let Ok((_, mut unit)) = world.units.get_mut(request.target) {
                unit.mounted = true;
            }
        }

        let proc_event = AuraProcEvent {
            involved_cast: Some(cast),
            ..Default::default()
        };
        world.with_unit(request.caster, |manager, ctx| manager.check_aura_procs(ctx, &proc_event));
        if request.target != request.caster {
            world.with_unit(request.target, |manager, ctx| manager.check_aura_procs(ctx, &proc_event));
        }
    }
}

pub fn process_damage_events(mut events: EventReader<UnitDamageEvent>, mut world: AuraWorld) {
    for event in events.read() {
        for entity in [event.attacker, event.target] {
            if let Ok((_, mut unit)) = world.units.get_mut(entity) {
                unit.in_combat = true;
            }
        }

        let proc_event = AuraProcEvent {
            damage_info: Some(DamageInfo {
                attacker: unit_id(event.attacker),
                target: unit_id(event.target),
                total_damage: event.amount,
                proc_victim: event.victim_outcome,
            }),
            is_melee_swing: event.is_melee_swing,
            ..Default::default()
        };

        let hit = AuraInterruptEvent {
            received_damage: event.amount > 0,
            ..Default::default()
        };
        world.with_unit(event.target, |manager, ctx| {
            manager.check_aura_interrupts(ctx, &hit);
            manager.check_aura_procs(ctx, &proc_event);
        });

        if event.attacker != event.target {
            world.with_unit(event.attacker, |manager, ctx| {
                manager.check_aura_interrupts(ctx, &AuraInterruptEvent::default());
                manager.check_aura_procs(ctx, &proc_event);
            });
        }
    }
}

pub fn process_interrupt_requests(mut requests: EventReader<AuraInterruptRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        world.with_unit(request.unit, |manager, ctx| {
            manager.check_aura_interrupts(ctx, &request.event)
        });
    }
}

pub fn process_proc_requests(mut requests: EventReader<AuraProcRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        world.with_unit(request.unit, |manager, ctx| manager.check_aura_procs(ctx, &request.event));
    }
}

pub fn process_stand_state_changes(mut events: EventReader<StandStateChanged>, mut world: AuraWorld) {
    for event in events.read() {
        let Ok((_, mut unit)) = world.units.get_mut(event.unit) else {
            continue;
        };
        if unit.stand_state == event.state {
            continue;
        }
        unit.stand_state = event.state;

        let interrupt = AuraInterruptEvent {
            changed_stand_state: true,
            ..Default::default()
        };
        world.with_unit(event.unit, |manager, ctx| manager.check_aura_interrupts(ctx, &interrupt));
    }
}

pub fn process_cancel_requests(mut requests: EventReader<CancelAuraRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        let accepted = world.with_unit(request.unit, |manager, ctx| {
            manager.handle_player_cancel_aura_request(ctx, request.spell_id)
        });
        if accepted == Some(false) {
            debug!("Cancel of spell {} refused", request.spell_id);
        }
    }
}

pub fn process_dispel_requests(mut requests: EventReader<DispelByCasterRequest>, mut world: AuraWorld) {
    for request in requests.read() {
        let caster = unit_id(request.caster);
        let removed = world.with_unit(request.unit, |manager, ctx| {
            manager.remove_harmful_auras_by_caster(ctx, caster)
        });
        debug!("Dispelled {} auras cast by {:?}", removed.unwrap_or(0), request.caster);
    }
}

pub fn process_unit_deaths(mut events: EventReader<UnitDiedEvent>, mut world: AuraWorld) {
    for event in events.read() {
        if let Ok((_, mut unit)) = world.units.get_mut(event.unit) {
            if unit.dead {
                continue;
            }
            unit.dead = true;
            unit.stand_state = StandState::Dead;
            info!("{} died", unit.name);
        }
        world.with_unit(event.unit, |manager, ctx| manager.handle_death(ctx));

        if let Some(killer) = event.killer {
            let kill = AuraProcEvent {
                killed_unit: true,
                ..Default::default()
            };
            world.with_unit(killer, |manager, ctx| manager.check_aura_procs(ctx, &kill));
        }
    }
}
