//! Unit component
//!
//! The ECS-side state of a unit that carries auras: the replicated field
//! block, outbound packets and the bits of world state interrupts read.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::aura::constants::UNIT_FIELD_AURA_END;
use crate::aura::{AuraHost, CasterRef, Packet, SpellId, SpellInfo, StandState, UnitId, UnitKind};

/// Map an entity to the id auras refer to it by.
pub fn unit_id(entity: Entity) -> UnitId {
    UnitId(entity.to_bits())
}

/// Reverse of [`unit_id`].
pub fn unit_entity(id: UnitId) -> Option<Entity> {
    Entity::try_from_bits(id.0).ok()
}

/// A cast that ended because the aura it fed was removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndedCast {
    pub spell_id: SpellId,
    pub interrupted: bool,
}

/// A unit that can host auras.
#[derive(Component, Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub name: String,
    pub in_combat: bool,
    pub mounted: bool,
    pub stand_state: StandState,
    pub on_water: bool,
    pub dead: bool,
    /// Replicated update fields, indexed by field offset
    pub fields: Vec<u32>,
    /// Packets waiting to be flushed to the controlling client
    pub outbox: Vec<Packet>,
    /// Threat accumulated per source (creatures only)
    pub threat: HashMap<UnitId, f32>,
    pub ended_casts: Vec<EndedCast>,
    pub unlocked_cooldowns: Vec<SpellId>,
}

impl Unit {
    pub fn new(entity: Entity, kind: UnitKind, name: impl Into<String>) -> Self {
        Self {
            id: unit_id(entity),
            kind,
            name: name.into(),
            in_combat: false,
            mounted: false,
            stand_state: StandState::Stand,
            on_water: false,
            dead: false,
            fields: vec![0; UNIT_FIELD_AURA_END],
            outbox: Vec::new(),
            threat: HashMap::new(),
            ended_casts: Vec::new(),
            unlocked_cooldowns: Vec::new(),
        }
    }

    pub fn caster_ref(&self) -> CasterRef {
        CasterRef::new(self.id, self.kind)
    }

    pub fn field(&self, field: usize) -> u32 {
        self.fields.get(field).copied().unwrap_or(0)
    }

    pub fn threat_from(&self, source: UnitId) -> f32 {
        self.threat.get(&source).copied().unwrap_or(0.0)
    }

    /// Hand the queued packets to the network layer.
    pub fn drain_outbox(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.outbox)
    }
}

impl AuraHost for Unit {
    fn unit_id(&self) -> UnitId {
        self.id
    }

    fn unit_kind(&self) -> UnitKind {
        self.kind
    }

    fn in_combat(&self) -> bool {
        self.in_combat
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    fn stand_state(&self) -> StandState {
        self.stand_state
    }

    fn is_on_water(&self) -> bool {
        self.on_water
    }

    fn set_uint32(&mut self, field: usize, value: u32) {
        if field >= self.fields.len() {
            self.fields.resize(field + 1, 0);
        }
        self.fields[field] = value;
    }

    fn enqueue_packet(&mut self, packet: Packet) {
        self.outbox.push(packet);
    }

    fn add_threat(&mut self, source: UnitId, amount: f32) {
        *self.threat.entry(source).or_insert(0.0) += amount;
    }

    fn remove_cast(&mut self, spell: &SpellInfo, interrupted: bool) {
        self.ended_casts.push(EndedCast {
            spell_id: spell.id,
            interrupted,
        });
    }

    fn unlock_spell_cooldown(&mut self, spell_id: SpellId) {
        self.unlocked_cooldowns.push(spell_id);
    }
}
