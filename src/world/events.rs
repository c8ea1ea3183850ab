//! Aura events
//!
//! Requests and game events routed into unit aura managers. Everything is
//! addressed by `Entity`; the systems translate to `UnitId` for the manager.

use bevy::prelude::*;
use bytes::Bytes;

use crate::aura::{AuraInterruptEvent, AuraProcEvent, ProcFlags, SpellId, StandState};

/// Apply every aura effect of a spell directly, skipping the cast flow
#[derive(Event, Clone, Debug)]
pub struct ApplyAuraRequest {
    pub caster: Entity,
    pub target: Entity,
    pub spell_id: SpellId,
}

/// Full cast: pre-flight check, cast interrupts, effects, cast procs
#[derive(Event, Clone, Debug)]
pub struct CastSpellRequest {
    pub caster: Entity,
    pub target: Entity,
    pub spell_id: SpellId,
}

/// One damage instance between two units
#[derive(Event, Clone, Debug)]
pub struct UnitDamageEvent {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
    /// Dodge, parry, block outcome on the victim side
    pub victim_outcome: ProcFlags,
    pub is_melee_swing: bool,
}

/// Raw interrupt check on one unit (movement, turning, ...)
#[derive(Event, Clone, Debug)]
pub struct AuraInterruptRequest {
    pub unit: Entity,
    pub event: AuraInterruptEvent,
}

/// Raw proc check on one unit
#[derive(Event, Clone, Debug)]
pub struct AuraProcRequest {
    pub unit: Entity,
    pub event: AuraProcEvent,
}

/// Unit sat down, stood up, knelt...
#[derive(Event, Clone, Debug)]
pub struct StandStateChanged {
    pub unit: Entity,
    pub state: StandState,
}

/// Player right-clicked an aura off
#[derive(Event, Clone, Debug)]
pub struct CancelAuraRequest {
    pub unit: Entity,
    pub spell_id: SpellId,
}

/// Remove every harmful aura `caster` put on `unit`
#[derive(Event, Clone, Debug)]
pub struct DispelByCasterRequest {
    pub unit: Entity,
    pub caster: Entity,
}

/// Unit died
#[derive(Event, Clone, Debug)]
pub struct UnitDiedEvent {
    pub unit: Entity,
    pub killer: Option<Entity>,
}

/// Raw use-item packet from a client
#[derive(Event, Clone, Debug)]
pub struct UseItemPacket {
    pub unit: Entity,
    pub payload: Bytes,
}
