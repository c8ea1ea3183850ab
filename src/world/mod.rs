//! ECS integration
//!
//! Mounts one `AuraManager` per `Unit` entity and feeds it from bevy events:
//!
//! - `AuraSystemPhase::Clock`: log time, duration ticks
//! - `AuraSystemPhase::Requests`: casts, direct applications, item use
//! - `AuraSystemPhase::Reactions`: damage, interrupts, procs, stand state,
//!   cancels, dispels, deaths
//!
//! Systems that emit aura events should run before `Requests` so their
//! events are consumed in the same frame.

use bevy::prelude::*;

pub mod effects;
pub mod events;
pub mod item_use;
pub mod log;
pub mod spell_book;
pub mod systems;
pub mod unit;

pub use effects::{LiveAuras, LoggingEffects};
pub use events::*;
pub use item_use::{Inventory, UseItemRequest};
pub use log::{AuraLog, AuraLogEntry, AuraLogEventType};
pub use spell_book::{load_spell_book, SpellBook, SpellBookConfig, DEFAULT_SPELL_BOOK_PATH};
pub use systems::AuraWorld;
pub use unit::{unit_entity, unit_id, Unit};

use crate::aura::{AuraManager, UnitKind};

/// System set labels for aura processing order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuraSystemPhase {
    /// Phase 1: advance the clock and expire auras
    Clock,
    /// Phase 2: new auras from casts and direct applications
    Requests,
    /// Phase 3: events that react to the auras already present
    Reactions,
}

/// Plugin wiring aura managers into the app.
///
/// Insert a loaded `SpellBook` before or after adding the plugin; an empty
/// book is used until then.
pub struct AuraPlugin;

impl Plugin for AuraPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ApplyAuraRequest>()
            .add_event::<CastSpellRequest>()
            .add_event::<UnitDamageEvent>()
            .add_event::<AuraInterruptRequest>()
            .add_event::<AuraProcRequest>()
            .add_event::<StandStateChanged>()
            .add_event::<CancelAuraRequest>()
            .add_event::<DispelByCasterRequest>()
            .add_event::<UnitDiedEvent>()
            .add_event::<UseItemPacket>()
            .init_resource::<SpellBook>()
            .init_resource::<AuraLog>()
            .init_resource::<LiveAuras>();

        app.configure_sets(
            Update,
            (
                AuraSystemPhase::Clock,
                AuraSystemPhase::Requests,
                AuraSystemPhase::Reactions,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (systems::update_log_time, systems::tick_auras)
                .chain()
                .in_set(AuraSystemPhase::Clock),
        )
        .add_systems(
            Update,
            (
                item_use::process_use_item_packets,
                systems::process_cast_requests,
                systems::process_apply_requests,
            )
                .chain()
                .in_set(AuraSystemPhase::Requests),
        )
        .add_systems(
            Update,
            (
                systems::process_damage_events,
                systems::process_interrupt_requests,
                systems::process_proc_requests,
                systems::process_stand_state_changes,
                systems::process_cancel_requests,
                systems::process_dispel_requests,
                systems::process_unit_deaths,
            )
                .chain()
                .in_set(AuraSystemPhase::Reactions),
        );
    }
}

/// Spawn a unit with an empty aura manager.
pub fn spawn_unit(commands: &mut Commands, kind: UnitKind, name: &str) -> Entity {
    let entity = commands.spawn_empty().id();
    commands
        .entity(entity)
        .insert((Unit::new(entity, kind, name), AuraManager::new()));
    entity
}

/// Same as [`spawn_unit`], for direct world access (tests, setup code).
pub fn spawn_unit_in(world: &mut World, kind: UnitKind, name: &str) -> Entity {
    let entity = world.spawn_empty().id();
    world
        .entity_mut(entity)
        .insert((Unit::new(entity, kind, name), AuraManager::new()));
    entity
}
