//! Shared test collaborators
//!
//! A recording host, a recording effect handler and a catalog with
//! configurable exclusivity, plus a harness that owns all three alongside
//! the manager under test.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use auramgr::aura::{
    AppliedAura, AuraContext, AuraHost, AuraManager, AuraSlot, AuraType, CasterRef, EffectHandler,
    Packet, SpellCatalog, SpellEffectInfo, SpellEffectType, SpellId, SpellInfo, StandState, UnitId,
    UnitKind,
};

pub const PLAYER_ID: UnitId = UnitId(1);
pub const OTHER_PLAYER_ID: UnitId = UnitId(2);
pub const CREATURE_ID: UnitId = UnitId(3);

pub fn player() -> CasterRef {
    CasterRef::new(PLAYER_ID, UnitKind::Player)
}

pub fn other_player() -> CasterRef {
    CasterRef::new(OTHER_PLAYER_ID, UnitKind::Player)
}

pub fn creature() -> CasterRef {
    CasterRef::new(CREATURE_ID, UnitKind::Creature)
}

// ============================================================================
// Host
// ============================================================================

pub struct MockHost {
    pub id: UnitId,
    pub kind: UnitKind,
    pub in_combat: bool,
    pub mounted: bool,
    pub stand_state: StandState,
    pub on_water: bool,
    pub fields: HashMap<usize, u32>,
    pub packets: Vec<Packet>,
    pub threat: Vec<(UnitId, f32)>,
    pub removed_casts: Vec<(SpellId, bool)>,
    pub unlocked_cooldowns: Vec<SpellId>,
}

impl MockHost {
    pub fn new(id: UnitId, kind: UnitKind) -> Self {
        Self {
            id,
            kind,
            in_combat: false,
            mounted: false,
            stand_state: StandState::Stand,
            on_water: false,
            fields: HashMap::new(),
            packets: Vec::new(),
            threat: Vec::new(),
            removed_casts: Vec::new(),
            unlocked_cooldowns: Vec::new(),
        }
    }

    pub fn field(&self, field: usize) -> u32 {
        self.fields.get(&field).copied().unwrap_or(0)
    }
}

impl AuraHost for MockHost {
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
        self.fields.insert(field, value);
    }

    fn enqueue_packet(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    fn add_threat(&mut self, source: UnitId, amount: f32) {
        self.threat.push((source, amount));
    }

    fn remove_cast(&mut self, spell: &SpellInfo, interrupted: bool) {
        self.removed_casts.push((spell.id, interrupted));
    }

    fn unlock_spell_cooldown(&mut self, spell_id: SpellId) {
        self.unlocked_cooldowns.push(spell_id);
    }
}

// ============================================================================
// Effect handler
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectCall {
    Apply { spell_id: SpellId, slot: Option<u8>, stacks: u32 },
    Remove { spell_id: SpellId, slot: Option<u8> },
    Proc { spell_id: SpellId, target: UnitId, charges: i32 },
    Tick { spell_id: SpellId },
    Dismount,
}

#[derive(Default)]
pub struct RecordingEffects {
    pub calls: Vec<EffectCall>,
}

impl RecordingEffects {
    pub fn removals_of(&self, spell_id: SpellId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Remove { spell_id: id, .. } if *id == spell_id))
            .count()
    }

    pub fn applies_of(&self, spell_id: SpellId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Apply { spell_id: id, .. } if *id == spell_id))
            .count()
    }

    pub fn procs_of(&self, spell_id: SpellId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Proc { spell_id: id, .. } if *id == spell_id))
            .count()
    }

    pub fn ticks_of(&self, spell_id: SpellId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Tick { spell_id: id } if *id == spell_id))
            .count()
    }
}

impl EffectHandler for RecordingEffects {
    fn apply(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost) {
        if aura.aura_type == AuraType::Mounted {
            target.set_mounted(true);
        }
        self.calls.push(EffectCall::Apply {
            spell_id: aura.spell_id,
            slot: aura.slot.map(|s| s.0),
            stacks: aura.applied_stacks,
        });
    }

    fn remove(&mut self, aura: &AppliedAura, target: &mut dyn AuraHost) {
        if aura.aura_type == AuraType::Mounted {
            target.set_mounted(false);
        }
        self.calls.push(EffectCall::Remove {
            spell_id: aura.spell_id,
            slot: aura.slot.map(|s| s.0),
        });
    }

    fn proc(&mut self, aura: &AppliedAura, effect_target: UnitId) {
        self.calls.push(EffectCall::Proc {
            spell_id: aura.spell_id,
            target: effect_target,
            charges: aura.proc_charges,
        });
    }

    fn periodic_tick(&mut self, aura: &AppliedAura, _target: &mut dyn AuraHost) {
        self.calls.push(EffectCall::Tick {
            spell_id: aura.spell_id,
        });
    }

    fn dismount(&mut self, target: &mut dyn AuraHost) {
        target.set_mounted(false);
        self.calls.push(EffectCall::Dismount);
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct MockCatalog {
    pub exclusive: Vec<(SpellId, SpellId)>,
}

impl SpellCatalog for MockCatalog {
    fn are_colliding_auras(&self, spell_a: SpellId, spell_b: SpellId) -> bool {
        self.exclusive
            .iter()
            .any(|&(a, b)| (a == spell_a && b == spell_b) || (a == spell_b && b == spell_a))
    }
}

// ============================================================================
// Spells
// ============================================================================

/// Single-effect aura spell with a 10 second duration.
pub fn aura_spell(id: SpellId, name: &str, rank: u32, aura_type: AuraType, harmful: bool) -> SpellInfo {
    SpellInfo {
        id,
        name: name.to_string(),
        subtext: if rank > 0 {
            format!("Rank {}", rank)
        } else {
            String::new()
        },
        duration_ms: 10_000,
        harmful,
        effects: vec![SpellEffectInfo {
            effect_type: SpellEffectType::ApplyAura,
            aura_type,
            amplitude_ms: 0,
            base_points: 0,
        }],
        ..Default::default()
    }
}

pub fn buff(id: SpellId, name: &str, rank: u32) -> SpellInfo {
    aura_spell(id, name, rank, AuraType::ModStat, false)
}

pub fn debuff(id: SpellId, name: &str, rank: u32) -> SpellInfo {
    aura_spell(id, name, rank, AuraType::Dummy, true)
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub host: MockHost,
    pub effects: RecordingEffects,
    pub catalog: MockCatalog,
    pub manager: AuraManager,
}

impl Harness {
    pub fn new(kind: UnitKind) -> Self {
        let id = match kind {
            UnitKind::Creature => CREATURE_ID,
            _ => PLAYER_ID,
        };
        Self {
            host: MockHost::new(id, kind),
            effects: RecordingEffects::default(),
            catalog: MockCatalog::default(),
            manager: AuraManager::new(),
        }
    }

    pub fn player() -> Self {
        Self::new(UnitKind::Player)
    }

    pub fn creature() -> Self {
        Self::new(UnitKind::Creature)
    }

    /// Run one manager operation with all collaborators borrowed.
    pub fn run<R>(&mut self, f: impl FnOnce(&mut AuraManager, &mut AuraContext<'_>) -> R) -> R {
        let mut ctx = AuraContext::new(&mut self.host, &mut self.effects, &self.catalog);
        f(&mut self.manager, &mut ctx)
    }

    /// Apply effect 0 of `spell`.
    pub fn apply(&mut self, caster: CasterRef, spell: &Arc<SpellInfo>) -> Option<AuraSlot> {
        let spell = Arc::clone(spell);
        self.run(|manager, ctx| manager.apply_spell_effect_aura(ctx, caster, spell, 0))
    }

    pub fn slots_of(&self, spell_id: SpellId) -> Vec<u8> {
        self.manager
            .get_auras_by_spell_id(spell_id)
            .filter_map(|aura| aura.slot.map(|s| s.0))
            .collect()
    }

    pub fn assert_slot_invariant(&self) {
        assert!(
            self.manager.registry().check_slot_invariant(),
            "slot invariant broken"
        );
    }
}
