//! Aura system
//!
//! Timed status effects (buffs, debuffs, stances, periodic effects) on a
//! single unit. The `AuraManager` owns the unit's auras and decides:
//! - whether a new aura may land, and what it displaces
//! - which slot it occupies and how that is replicated
//! - when events interrupt or proc the auras already present
//!
//! The manager talks to the outside world only through the traits in
//! [`host`]; the ECS wiring lives in `crate::world`.

pub mod applied;
pub mod constants;
pub mod flags;
pub mod host;
pub mod interrupts;
pub mod lifecycle;
pub mod manager;
pub mod packet;
pub mod procs;
pub mod registry;
pub mod slots;
pub mod spell;
pub mod sync;

pub use applied::{AppliedAura, AuraId, AuraKey, PeriodicTimer};
pub use flags::{InterruptFlags, ProcFlags, SpellAttributes, SpellAttributesEx};
pub use host::{
    AuraContext, AuraHost, CasterRef, EffectHandler, SpellCatalog, StandState, UnitId, UnitKind,
};
pub use interrupts::AuraInterruptEvent;
pub use manager::AuraManager;
pub use packet::{AuraDurationUpdate, Opcode, Packet, PacketError};
pub use procs::{AuraProcEvent, DamageInfo};
pub use registry::AuraRegistry;
pub use slots::{AuraSlot, SlotBand};
pub use spell::{AuraType, CastRef, Refreshment, SpellEffectInfo, SpellEffectType, SpellId, SpellInfo};
pub use sync::{AuraWrite, ReplicationFlags};
