//! Integration tests for the ECS wiring
//!
//! These tests drive a bare `App` with the `AuraPlugin` and the shipped
//! spell book, advancing time by hand:
//! - Casts, damage and stand state changes reach the right managers
//! - Units mirror aura state into their fields, threat and mount flag
//! - The aura log records every transition

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use bytes::Bytes;

use auramgr::aura::constants::UNIT_FIELD_AURA;
use auramgr::aura::{AuraInterruptEvent, AuraManager, AuraType, ProcFlags, StandState, UnitKind};
use auramgr::world::item_use::BACKPACK_BAG;
use auramgr::world::{
    load_spell_book, spawn_unit_in, unit_id, ApplyAuraRequest, AuraInterruptRequest, AuraLog,
    AuraLogEventType, AuraPlugin, CancelAuraRequest, CastSpellRequest, DispelByCasterRequest,
    Inventory, StandStateChanged, Unit, UnitDamageEvent, UnitDiedEvent, UseItemPacket,
    DEFAULT_SPELL_BOOK_PATH,
};

fn test_app() -> App {
    let spell_book = load_spell_book(Path::new(DEFAULT_SPELL_BOOK_PATH)).expect("spell book loads");
    let mut app = App::new();
    app.add_plugins(AuraPlugin)
        .init_resource::<Time>()
        .insert_resource(spell_book);
    app
}

/// Advance the clock by `ms` and run one frame.
fn step(app: &mut App, ms: u64) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_millis(ms));
    app.update();
}

fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}

fn unit(app: &App, entity: Entity) -> &Unit {
    app.world().get::<Unit>(entity).expect("entity is a unit")
}

fn manager(app: &App, entity: Entity) -> &AuraManager {
    app.world().get::<AuraManager>(entity).expect("entity has auras")
}

fn aura_log(app: &App) -> &AuraLog {
    app.world().resource::<AuraLog>()
}

fn cast(app: &mut App, caster: Entity, target: Entity, spell_id: u32) {
    send(app, CastSpellRequest { caster, target, spell_id });
    step(app, 0);
}

fn hit(app: &mut App, attacker: Entity, target: Entity, amount: u32) {
    send(
        app,
        UnitDamageEvent {
            attacker,
            target,
            amount,
            victim_outcome: ProcFlags::NONE,
            is_melee_swing: true,
        },
    );
    step(app, 0);
}

fn spawn_pair(app: &mut App) -> (Entity, Entity) {
    let hero = spawn_unit_in(app.world_mut(), UnitKind::Player, "hero");
    let wolf = spawn_unit_in(app.world_mut(), UnitKind::Creature, "wolf");
    (hero, wolf)
}

// ============================================================================
// Application and ticking
// ============================================================================

#[test]
fn test_cast_debuff_ticks_and_expires() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, wolf, 172);

    assert!(manager(&app, wolf).has_aura_by_spell_id(172));
    assert_eq!(unit(&app, wolf).field(UNIT_FIELD_AURA + 24), 172);
    assert_eq!(unit(&app, wolf).threat_from(unit_id(hero)), 10.0);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Applied, unit_id(wolf), 172), 1);

    step(&mut app, 12_000);

    assert!(!manager(&app, wolf).has_aura_by_spell_id(172));
    assert_eq!(unit(&app, wolf).field(UNIT_FIELD_AURA + 24), 0);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Periodic, unit_id(wolf), 172), 4);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Removed, unit_id(wolf), 172), 1);
}

#[test]
fn test_repeated_applications_stack() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    for _ in 0..3 {
        send(
            &mut app,
            ApplyAuraRequest {
                caster: hero,
                target: wolf,
                spell_id: 7386,
            },
        );
    }
    step(&mut app, 0);

    let stacks: Vec<u32> = manager(&app, wolf)
        .get_auras_by_spell_id(7386)
        .map(|aura| aura.applied_stacks)
        .collect();
    assert_eq!(stacks, vec![3]);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Applied, unit_id(wolf), 7386), 1);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Refreshed, unit_id(wolf), 7386), 2);
}

#[test]
fn test_player_receives_duration_packets() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 1459);

    assert_eq!(unit(&app, hero).outbox.len(), 1);
    assert_eq!(unit(&app, hero).field(UNIT_FIELD_AURA), 1459);
}

// ============================================================================
// Item use and refreshment
// ============================================================================

#[test]
fn test_food_from_backpack_ends_on_standing() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);
    app.world_mut()
        .entity_mut(hero)
        .insert(Inventory::default().with_item(BACKPACK_BAG, 23, 433));

    send(&mut app, StandStateChanged { unit: hero, state: StandState::Sit });
    step(&mut app, 0);
    send(
        &mut app,
        UseItemPacket {
            unit: hero,
            payload: Bytes::from_static(&[0xFF, 23]),
        },
    );
    step(&mut app, 0);
    assert!(manager(&app, hero).has_aura_by_spell_id(433));

    step(&mut app, 3_000);
    assert_eq!(aura_log(&app).count(AuraLogEventType::Periodic, unit_id(hero), 433), 1);

    send(&mut app, StandStateChanged { unit: hero, state: StandState::Stand });
    step(&mut app, 0);
    assert!(!manager(&app, hero).has_aura_by_spell_id(433));
}

#[test]
fn test_malformed_or_empty_item_use_does_nothing() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);

    send(
        &mut app,
        UseItemPacket {
            unit: hero,
            payload: Bytes::from_static(&[0xFF]),
        },
    );
    send(
        &mut app,
        UseItemPacket {
            unit: hero,
            payload: Bytes::from_static(&[0xFF, 5]),
        },
    );
    step(&mut app, 0);

    assert!(manager(&app, hero).is_empty());
    assert!(aura_log(&app).entries.is_empty());
}

// ============================================================================
// Mounts
// ============================================================================

#[test]
fn test_mount_aura_blocks_summon_and_breaks_on_damage() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 458);
    assert!(unit(&app, hero).mounted);
    assert_eq!(manager(&app, hero).len(), 2);

    cast(&mut app, hero, hero, 470);
    assert_eq!(aura_log(&app).count(AuraLogEventType::CastVetoed, unit_id(hero), 470), 1);
    assert!(manager(&app, hero).has_aura_by_spell_id(458));

    hit(&mut app, wolf, hero, 15);
    assert!(!unit(&app, hero).mounted);
    assert!(manager(&app, hero).is_empty());
}

#[test]
fn test_mount_aura_while_summoned_mount_dismounts() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 470);
    assert!(unit(&app, hero).mounted);

    cast(&mut app, hero, hero, 458);

    assert!(!unit(&app, hero).mounted);
    assert_eq!(manager(&app, hero).get_auras_by_type(AuraType::Mounted).count(), 0);
    assert_eq!(aura_log(&app).filter_by_type(AuraLogEventType::Dismounted).len(), 1);
}

// ============================================================================
// Interrupts and procs
// ============================================================================

#[test]
fn test_stealth_breaks_only_on_loud_casts() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 1784);
    cast(&mut app, hero, wolf, 921);
    assert!(manager(&app, hero).has_aura_by_spell_id(1784));

    cast(&mut app, hero, wolf, 1752);
    assert!(!manager(&app, hero).has_aura_by_spell_id(1784));
    assert_eq!(unit(&app, hero).unlocked_cooldowns, vec![1784]);
}

#[test]
fn test_movement_request_interrupts_drink() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 430);
    send(
        &mut app,
        AuraInterruptRequest {
            unit: hero,
            event: AuraInterruptEvent {
                moved: true,
                ..Default::default()
            },
        },
    );
    step(&mut app, 0);

    assert!(!manager(&app, hero).has_aura_by_spell_id(430));
}

#[test]
fn test_lightning_shield_spends_charges_on_hits() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 324);
    for _ in 0..3 {
        hit(&mut app, wolf, hero, 20);
    }

    assert!(!manager(&app, hero).has_aura_by_spell_id(324));
    assert_eq!(aura_log(&app).count(AuraLogEventType::Proc, unit_id(hero), 324), 3);
    assert!(unit(&app, hero).in_combat);
    assert!(unit(&app, wolf).in_combat);
}

// ============================================================================
// Removal paths
// ============================================================================

#[test]
fn test_death_keeps_racial_and_strips_curse() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 20599);
    cast(&mut app, wolf, hero, 702);
    send(&mut app, UnitDiedEvent { unit: hero, killer: Some(wolf) });
    step(&mut app, 0);

    let hero_unit = unit(&app, hero);
    assert!(hero_unit.dead);
    assert_eq!(hero_unit.stand_state, StandState::Dead);
    assert!(manager(&app, hero).has_aura_by_spell_id(20599));
    assert!(!manager(&app, hero).has_aura_by_spell_id(702));
}

#[test]
fn test_cancel_requests() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);

    cast(&mut app, hero, hero, 1459);
    cast(&mut app, wolf, hero, 702);
    send(&mut app, CancelAuraRequest { unit: hero, spell_id: 702 });
    send(&mut app, CancelAuraRequest { unit: hero, spell_id: 1459 });
    step(&mut app, 0);

    assert!(manager(&app, hero).has_aura_by_spell_id(702));
    assert!(!manager(&app, hero).has_aura_by_spell_id(1459));
    assert!(unit(&app, hero)
        .ended_casts
        .iter()
        .any(|ended| ended.spell_id == 1459 && ended.interrupted));
}

#[test]
fn test_dispel_by_caster() {
    let mut app = test_app();
    let (hero, wolf) = spawn_pair(&mut app);
    let other = spawn_unit_in(app.world_mut(), UnitKind::Player, "warlock");

    cast(&mut app, wolf, hero, 702);
    cast(&mut app, other, hero, 172);
    send(&mut app, DispelByCasterRequest { unit: hero, caster: wolf });
    step(&mut app, 0);

    assert!(!manager(&app, hero).has_aura_by_spell_id(702));
    assert!(manager(&app, hero).has_aura_by_spell_id(172));
}

#[test]
fn test_request_for_non_unit_is_ignored() {
    let mut app = test_app();
    let (hero, _) = spawn_pair(&mut app);
    let rock = app.world_mut().spawn_empty().id();

    cast(&mut app, hero, rock, 172);
    cast(&mut app, rock, hero, 172);

    assert!(manager(&app, hero).is_empty());
}
