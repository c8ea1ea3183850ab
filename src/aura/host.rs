//! Collaborator seams for the aura manager.
//!
//! The manager owns nothing but its registry. Everything it reads or writes
//! on the outside goes through one of three traits:
//!
//! - `AuraHost`: the unit that owns the auras (state, replicated fields,
//!   outbound packets, casts, threat)
//! - `EffectHandler`: what an aura actually does to its target
//! - `SpellCatalog`: static spell lookups (ranks, exclusivity)
//!
//! A call into the manager borrows all three at once through `AuraContext`.

use serde::{Deserialize, Serialize};

use super::applied::AppliedAura;
use super::flags::SpellAttributesEx;
use super::packet::Packet;
use super::spell::{CastRef, SpellId, SpellInfo};

/// Stable identity of a unit. Auras hold ids, never references, because a
/// caster may leave the world while its aura persists on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Player,
    Creature,
    GameObject,
}

impl UnitKind {
    /// Players and creatures are units; game objects are not.
    pub fn is_unit(self) -> bool {
        matches!(self, UnitKind::Player | UnitKind::Creature)
    }
}

/// Who applied an aura.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CasterRef {
    pub id: UnitId,
    pub kind: UnitKind,
}

impl CasterRef {
    pub fn new(id: UnitId, kind: UnitKind) -> Self {
        Self { id, kind }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandState {
    #[default]
    Stand,
    Sit,
    SitChair,
    Sleep,
    Kneel,
    Dead,
}

/// The unit that owns an aura manager.
pub trait AuraHost {
    fn unit_id(&self) -> UnitId;
    fn unit_kind(&self) -> UnitKind;

    /// Only player-controlled hosts receive duration packets.
    fn is_player_controlled(&self) -> bool {
        self.unit_kind() == UnitKind::Player
    }

    fn in_combat(&self) -> bool;
    fn is_mounted(&self) -> bool;
    fn set_mounted(&mut self, mounted: bool);
    fn stand_state(&self) -> StandState;
    fn is_on_water(&self) -> bool;

    /// Write a raw replicated field.
    fn set_uint32(&mut self, field: usize, value: u32);
    /// Queue a packet for the controlling player.
    fn enqueue_packet(&mut self, packet: Packet);

    fn add_threat(&mut self, source: UnitId, amount: f32);
    /// Cancel the channel or area cast an aura was tied to, if any.
    fn remove_cast(&mut self, spell: &SpellInfo, interrupted: bool);
    fn unlock_spell_cooldown(&mut self, spell_id: SpellId);
}

/// Applies and reverses the stat and state consequences of auras.
pub trait EffectHandler {
    /// Apply or refresh. Called on every application, including refreshes.
    fn apply(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost);
    fn remove(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost);
    /// Triggered by a proc. `effect_target` is the other unit of the event.
    fn proc(&mut self, aura: &AppliedAura, effect_target: UnitId);

    fn periodic_tick(&mut self, _aura: &AppliedAura, _target: &mut dyn AuraHost) {}

    /// Drop a mount that was not applied through an aura.
    fn dismount(&mut self, target: &mut dyn AuraHost) {
        target.set_mounted(false);
    }
}

/// Static spell lookups.
pub trait SpellCatalog {
    fn rank_of(&self, spell: &SpellInfo) -> u32 {
        spell.rank_from_subtext()
    }

    /// Spells sharing an exclusivity group (seals, curses).
    fn are_colliding_auras(&self, spell_a: SpellId, spell_b: SpellId) -> bool;

    fn is_refreshment_spell(&self, spell: &SpellInfo) -> bool {
        spell.refreshment.is_some()
    }

    fn generates_threat(&self, spell: &SpellInfo) -> bool {
        !spell.attributes_ex.contains(SpellAttributesEx::NO_THREAT)
    }

    fn cast_breaks_stealth(&self, cast: &CastRef) -> bool {
        !cast
            .spell
            .attributes_ex
            .contains(SpellAttributesEx::NOT_BREAK_STEALTH)
    }
}

/// Everything one manager call needs from the outside world.
pub struct AuraContext<'a> {
    pub host: &'a mut dyn AuraHost,
    pub effects: &'a mut dyn EffectHandler,
    pub catalog: &'a dyn SpellCatalog,
}

impl<'a> AuraContext<'a> {
    pub fn new(
        host: &'a mut dyn AuraHost,
        effects: &'a mut dyn EffectHandler,
        catalog: &'a dyn SpellCatalog,
    ) -> Self {
        Self {
            host,
            effects,
            catalog,
        }
    }
}
