//! Headless scenario execution
//!
//! Runs aura scenarios without any graphical output on a fixed simulated
//! frame step, suitable for automated testing and soak runs.

use bevy::ecs::system::SystemParam;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bytes::{BufMut, BytesMut};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aura::{
    AuraDurationUpdate, AuraInterruptEvent, AuraManager, ProcFlags, SpellId, UnitId, UnitKind,
};
use crate::world::{
    load_spell_book, spawn_unit, ApplyAuraRequest, AuraInterruptRequest, AuraLog, AuraLogEventType,
    AuraPlugin, AuraSystemPhase, CancelAuraRequest, CastSpellRequest, DispelByCasterRequest, Inventory,
    SpellBook, StandStateChanged, Unit, UnitDamageEvent, UnitDiedEvent, UseItemPacket,
    DEFAULT_SPELL_BOOK_PATH,
};
use crate::world::item_use::BACKPACK_BAG;

use super::config::{ActionKind, ScenarioAction, ScenarioConfig};
use super::soak::{generate_random_actions, GameRng};

/// Knobs that come from the command line rather than the scenario file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Override the scenario's output path
    pub output_path: Option<PathBuf>,
    /// Override the spell book path
    pub spells_path: Option<PathBuf>,
    /// Hard stop after this many frames
    pub max_frames: Option<u32>,
    /// Install bevy's log subscriber (once per process)
    pub with_logging: bool,
}

/// Result of a completed headless scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Frames simulated
    pub frames: u32,
    /// Simulated time in milliseconds
    pub elapsed_ms: u32,
    /// Per-unit end state, in scenario order
    pub units: Vec<UnitResult>,
    /// Number of aura log entries
    pub log_entries: usize,
    /// Frames on which some manager broke the slot invariant
    pub invariant_violations: u32,
    /// Duration packets that failed to decode
    pub malformed_packets: u32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Where the log was written, if anywhere
    pub log_path: Option<String>,
}

impl ScenarioResult {
    pub fn unit(&self, name: &str) -> Option<&UnitResult> {
        self.units.iter().find(|unit| unit.name == name)
    }
}

/// End state of a single unit
#[derive(Debug, Clone)]
pub struct UnitResult {
    pub name: String,
    pub kind: UnitKind,
    /// Active auras: (slot, spell id, stacks)
    pub auras: Vec<(u8, SpellId, u32)>,
    pub mounted: bool,
    pub dead: bool,
    /// Total threat held against this unit's attackers
    pub total_threat: f32,
    /// Duration packets flushed over the run
    pub packets_sent: usize,
}

impl UnitResult {
    pub fn has_spell(&self, spell_id: SpellId) -> bool {
        self.auras.iter().any(|(_, id, _)| *id == spell_id)
    }
}

/// Name to entity lookup for scenario actions
#[derive(Resource, Default)]
pub struct ScenarioUnits {
    by_name: HashMap<String, Entity>,
    order: Vec<String>,
}

impl ScenarioUnits {
    pub fn get(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }
}

/// Resource to track headless scenario state
#[derive(Resource)]
pub struct HeadlessScenarioState {
    pub config: ScenarioConfig,
    /// Actions not yet dispatched, in time order
    pub pending: VecDeque<ScenarioAction>,
    pub elapsed_ms: u32,
    pub max_duration_ms: u32,
    pub frames: u32,
    pub complete: bool,
    pub invariant_violations: u32,
    pub malformed_packets: u32,
    pub packets_sent: HashMap<Entity, usize>,
}

/// Event writers for every action a scenario can issue
#[derive(SystemParam)]
pub struct ScenarioWriters<'w> {
    casts: EventWriter<'w, CastSpellRequest>,
    applies: EventWriter<'w, ApplyAuraRequest>,
    damage: EventWriter<'w, UnitDamageEvent>,
    interrupts: EventWriter<'w, AuraInterruptRequest>,
    stand_states: EventWriter<'w, StandStateChanged>,
    cancels: EventWriter<'w, CancelAuraRequest>,
    dispels: EventWriter<'w, DispelByCasterRequest>,
    deaths: EventWriter<'w, UnitDiedEvent>,
    item_uses: EventWriter<'w, UseItemPacket>,
}

/// Plugin for headless scenario execution
pub struct HeadlessPlugin {
    pub config: ScenarioConfig,
    pub actions: Vec<ScenarioAction>,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let max_duration_ms = (self.config.max_duration_secs * 1000.0) as u32;

        app.insert_resource(HeadlessScenarioState {
            config: self.config.clone(),
            pending: self.actions.iter().cloned().collect(),
            elapsed_ms: 0,
            max_duration_ms,
            frames: 0,
            complete: false,
            invariant_violations: 0,
            malformed_packets: 0,
            packets_sent: HashMap::new(),
        })
        .init_resource::<ScenarioUnits>()
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(u64::from(
            self.config.frame_ms,
        ))));

        app.add_systems(Startup, headless_setup_scenario)
            .add_systems(
                Update,
                headless_dispatch_actions
                    .after(AuraSystemPhase::Clock)
                    .before(AuraSystemPhase::Requests),
            )
            .add_systems(
                Update,
                (headless_check_invariants, headless_check_end)
                    .chain()
                    .after(AuraSystemPhase::Reactions),
            );
    }
}

/// Setup system for a headless scenario
fn headless_setup_scenario(
    mut commands: Commands,
    state: Res<HeadlessScenarioState>,
    mut units: ResMut<ScenarioUnits>,
    mut aura_log: ResMut<AuraLog>,
) {
    aura_log.clear();

    for unit in &state.config.units {
        let entity = spawn_unit(&mut commands, unit.kind, &unit.name);
        if !unit.items.is_empty() {
            let inventory = unit
                .items
                .iter()
                .fold(Inventory::default(), |inv, (slot, spell_id)| {
                    inv.with_item(BACKPACK_BAG, *slot, *spell_id)
                });
            commands.entity(entity).insert(inventory);
        }
        units.by_name.insert(unit.name.clone(), entity);
        units.order.push(unit.name.clone());
    }

    info!(
        "Headless scenario setup complete: {} units, {} actions",
        state.config.units.len(),
        state.pending.len()
    );
}

/// Advance the scenario clock and issue every action that is due.
fn headless_dispatch_actions(
    time: Res<Time>,
    mut state: ResMut<HeadlessScenarioState>,
    units: Res<ScenarioUnits>,
    mut writers: ScenarioWriters,
) {
    if state.complete {
        return;
    }
    state.frames += 1;
    let step = time.delta().as_millis().min(u128::from(u32::MAX)) as u32;
    state.elapsed_ms = state.elapsed_ms.saturating_add(step);

    while state
        .pending
        .front()
        .is_some_and(|action| action.at_ms <= state.elapsed_ms)
    {
        let Some(action) = state.pending.pop_front() else {
            break;
        };
        if !dispatch_action(&action.kind, &units, &mut writers) {
            warn!("Skipped action at {} ms: unknown unit", action.at_ms);
        }
    }
}

fn dispatch_action(kind: &ActionKind, units: &ScenarioUnits, writers: &mut ScenarioWriters) -> bool {
    let entity = |name: &str| units.get(name);

    match kind {
        ActionKind::Cast {
            caster,
            target,
            spell_id,
        } => {
            let (Some(caster), Some(target)) = (entity(caster), entity(target)) else {
                return false;
            };
            writers.casts.send(CastSpellRequest {
                caster,
                target,
                spell_id: *spell_id,
            });
        }
        ActionKind::Apply {
            caster,
            target,
            spell_id,
        } => {
            let (Some(caster), Some(target)) = (entity(caster), entity(target)) else {
                return false;
            };
            writers.applies.send(ApplyAuraRequest {
                caster,
                target,
                spell_id: *spell_id,
            });
        }
        ActionKind::Damage {
            attacker,
            target,
            amount,
            melee,
        } => {
            let (Some(attacker), Some(target)) = (entity(attacker), entity(target)) else {
                return false;
            };
            writers.damage.send(UnitDamageEvent {
                attacker,
                target,
                amount: *amount,
                victim_outcome: ProcFlags::NONE,
                is_melee_swing: *melee,
            });
        }
        ActionKind::Move { unit } | ActionKind::Turn { unit } => {
            let Some(unit_entity) = entity(unit) else {
                return false;
            };
            let moved = matches!(kind, ActionKind::Move { .. });
            writers.interrupts.send(AuraInterruptRequest {
                unit: unit_entity,
                event: AuraInterruptEvent {
                    moved,
                    turned: !moved,
                    ..Default::default()
                },
            });
        }
        ActionKind::StandState { unit, state } => {
            let Some(unit) = entity(unit) else {
                return false;
            };
            writers.stand_states.send(StandStateChanged { unit, state: *state });
        }
        ActionKind::Cancel { unit, spell_id } => {
            let Some(unit) = entity(unit) else {
                return false;
            };
            writers.cancels.send(CancelAuraRequest {
                unit,
                spell_id: *spell_id,
            });
        }
        ActionKind::Dispel { unit, caster } => {
            let (Some(unit), Some(caster)) = (entity(unit), entity(caster)) else {
                return false;
            };
            writers.dispels.send(DispelByCasterRequest { unit, caster });
        }
        ActionKind::Kill { unit, killer } => {
            let Some(unit) = entity(unit) else {
                return false;
            };
            let killer = killer.as_deref().and_then(entity);
            writers.deaths.send(UnitDiedEvent { unit, killer });
        }
        ActionKind::UseItem { unit, bag, slot } => {
            let Some(unit) = entity(unit) else {
                return false;
            };
            let mut payload = BytesMut::with_capacity(2);
            payload.put_u8(*bag);
            payload.put_u8(*slot);
            writers.item_uses.send(UseItemPacket {
                unit,
                payload: payload.freeze(),
            });
        }
    }
    true
}

/// Check every manager's slot bookkeeping and flush the duration packets
/// the frame produced.
fn headless_check_invariants(
    mut state: ResMut<HeadlessScenarioState>,
    mut units: Query<(Entity, &AuraManager, &mut Unit)>,
) {
    let mut violated = false;
    for (entity, manager, mut unit) in units.iter_mut() {
        if !manager.registry().check_slot_invariant() {
            warn!("Slot invariant broken on {} at {} ms", unit.name, state.elapsed_ms);
            violated = true;
        }

        let packets = unit.drain_outbox();
        for packet in &packets {
            if let Err(e) = AuraDurationUpdate::from_packet(packet) {
                warn!("Malformed duration packet for {}: {}", unit.name, e);
                state.malformed_packets += 1;
            }
        }
        *state.packets_sent.entry(entity).or_insert(0) += packets.len();
    }

    if violated {
        state.invariant_violations += 1;
    }
}

/// Mark the scenario complete once simulated time runs out
fn headless_check_end(mut state: ResMut<HeadlessScenarioState>, mut aura_log: ResMut<AuraLog>) {
    if state.complete || state.elapsed_ms < state.max_duration_ms {
        return;
    }

    info!("Scenario finished after {} ms ({} frames)", state.elapsed_ms, state.frames);
    aura_log.log(
        AuraLogEventType::Scenario,
        UnitId(0),
        None,
        None,
        format!("Scenario finished after {} ms", state.elapsed_ms),
    );
    state.complete = true;
}

fn build_scenario_result(app: &mut App, random_seed: Option<u64>) -> ScenarioResult {
    let mut query = app.world_mut().query::<(&Unit, &AuraManager)>();
    let world = app.world();

    let scenario_units = world.resource::<ScenarioUnits>();
    let state = world.resource::<HeadlessScenarioState>();

    let units = scenario_units
        .order
        .iter()
        .filter_map(|name| scenario_units.get(name))
        .filter_map(|entity| {
            let (unit, manager) = query.get(world, entity).ok()?;
            Some(UnitResult {
                name: unit.name.clone(),
                kind: unit.kind,
                auras: manager
                    .auras()
                    .filter_map(|aura| Some((aura.slot?.0, aura.spell_id, aura.applied_stacks)))
                    .collect(),
                mounted: unit.mounted,
                dead: unit.dead,
                total_threat: unit.threat.values().sum(),
                packets_sent: state.packets_sent.get(&entity).copied().unwrap_or(0),
            })
        })
        .collect();

    ScenarioResult {
        frames: state.frames,
        elapsed_ms: state.elapsed_ms,
        units,
        log_entries: world.resource::<AuraLog>().entries.len(),
        invariant_violations: state.invariant_violations,
        malformed_packets: state.malformed_packets,
        random_seed,
        log_path: None,
    }
}

/// Build the app for a scenario without running it.
pub fn build_scenario_app(config: ScenarioConfig, spell_book: SpellBook, options: &RunOptions) -> App {
    let mut actions = config.sorted_actions();
    let mut rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => GameRng::from_entropy(),
    };
    if config.random_events > 0 {
        let names: Vec<String> = config.units.iter().map(|unit| unit.name.clone()).collect();
        let max_ms = (config.max_duration_secs * 1000.0) as u32;
        actions.extend(generate_random_actions(
            &mut rng,
            &names,
            &spell_book.aura_spell_ids(),
            config.random_events,
            max_ms,
        ));
        actions.sort_by_key(|action| action.at_ms);
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if options.with_logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(spell_book)
        .insert_resource(rng)
        .add_plugins(AuraPlugin)
        .add_plugins(HeadlessPlugin { config, actions });
    app
}

/// Run a headless scenario with the given configuration
pub fn run_headless_scenario(mut config: ScenarioConfig, options: RunOptions) -> Result<ScenarioResult, String> {
    if let Some(path) = &options.output_path {
        config.output_path = Some(path.display().to_string());
    }
    let spells_path = options
        .spells_path
        .clone()
        .or_else(|| config.spells_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPELL_BOOK_PATH));
    let spell_book = load_spell_book(&spells_path)?;

    println!("Starting headless aura scenario...");
    println!("  Units: {}", config.units.len());
    println!("  Scripted actions: {}", config.actions.len());
    println!("  Random events: {}", config.random_events);
    println!("  Max duration: {:.1}s", config.max_duration_secs);

    let random_seed = config.random_seed;
    let output_path = config.output_path.clone();
    let frame_budget = options.max_frames.unwrap_or_else(|| {
        // The first frame only starts the clock
        let frames = (config.max_duration_secs * 1000.0) / config.frame_ms as f32;
        frames.ceil() as u32 + 2
    });

    let mut app = build_scenario_app(config, spell_book, &options);
    app.finish();
    app.cleanup();

    for _ in 0..frame_budget {
        app.update();
        if app.world().resource::<HeadlessScenarioState>().complete {
            break;
        }
    }

    let mut result = build_scenario_result(&mut app, random_seed);
    if let Some(path) = output_path {
        let written = app
            .world()
            .resource::<AuraLog>()
            .save_to_file(Path::new(&path))?;
        println!("Scenario complete. Log saved to: {}", written);
        result.log_path = Some(written);
    }

    print_summary(&result);
    Ok(result)
}

fn print_summary(result: &ScenarioResult) {
    println!(
        "Simulated {} ms over {} frames, {} log entries",
        result.elapsed_ms, result.frames, result.log_entries
    );
    for unit in &result.units {
        let auras: Vec<String> = unit
            .auras
            .iter()
            .map(|(slot, spell_id, stacks)| format!("{}@{}x{}", spell_id, slot, stacks))
            .collect();
        println!(
            "  {} ({:?}): [{}]{}{}",
            unit.name,
            unit.kind,
            auras.join(", "),
            if unit.mounted { " mounted" } else { "" },
            if unit.dead { " dead" } else { "" }
        );
    }
    if result.invariant_violations > 0 {
        println!("  Slot invariant violated on {} frames", result.invariant_violations);
    }
}
