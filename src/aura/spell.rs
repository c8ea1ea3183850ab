//! Static spell descriptors as seen by the aura manager.
//!
//! A `SpellInfo` is shared (`Arc`) between the catalog, casts in flight and
//! every aura created from it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::flags::{InterruptFlags, ProcFlags, SpellAttributes, SpellAttributesEx};
use super::host::UnitId;

pub type SpellId = u32;

/// What an applied aura does, as far as collision rules care.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuraType {
    #[default]
    None,
    Dummy,
    PeriodicDamage,
    PeriodicHeal,
    PeriodicTriggerSpell,
    ModStat,
    ModResistance,
    ModDamageDone,
    ModIncreaseSpeed,
    ModDecreaseSpeed,
    ModRoot,
    ModStun,
    ModStealth,
    /// Druid forms, stances. Only one may be active at a time.
    ModShapeshift,
    Mounted,
    ProcTriggerSpell,
    SchoolAbsorb,
}

/// Effect kinds the aura manager inspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellEffectType {
    #[default]
    None,
    ApplyAura,
    SummonMount,
    SchoolDamage,
    Heal,
    Dummy,
}

/// Food and drink spells require the caster to stay seated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Refreshment {
    Food,
    Drink,
}

/// One effect of a spell.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpellEffectInfo {
    pub effect_type: SpellEffectType,
    #[serde(default)]
    pub aura_type: AuraType,
    /// Period of a periodic aura in milliseconds (0 = not periodic)
    #[serde(default)]
    pub amplitude_ms: u32,
    #[serde(default)]
    pub base_points: i32,
}

fn default_duration() -> i32 {
    -1
}

/// Static description of a spell.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpellInfo {
    pub id: SpellId,
    /// Display name shared by every rank of the spell
    pub name: String,
    /// Rank subtext, e.g. "Rank 2" (empty for unranked spells)
    #[serde(default)]
    pub subtext: String,
    #[serde(default)]
    pub attributes: SpellAttributes,
    #[serde(default)]
    pub attributes_ex: SpellAttributesEx,
    /// Aura duration in milliseconds (-1 = until removed)
    #[serde(default = "default_duration")]
    pub duration_ms: i32,
    #[serde(default)]
    pub harmful: bool,
    #[serde(default)]
    pub aura_interrupt_flags: InterruptFlags,
    #[serde(default)]
    pub proc_flags: ProcFlags,
    /// Number of procs before the aura is consumed (0 = unlimited)
    #[serde(default)]
    pub proc_charges: u32,
    /// Maximum stacks (0 or 1 = does not stack)
    #[serde(default)]
    pub stack_amount: u32,
    #[serde(default)]
    pub refreshment: Option<Refreshment>,
    pub effects: Vec<SpellEffectInfo>,
}

impl SpellInfo {
    pub fn effect(&self, index: usize) -> Option<&SpellEffectInfo> {
        self.effects.get(index)
    }

    pub fn is_passive(&self) -> bool {
        self.attributes.contains(SpellAttributes::PASSIVE)
    }

    /// Cooldown is held until the aura ends, then unlocked.
    pub fn unlock_cooldown_on_trigger(&self) -> bool {
        self.attributes.contains(SpellAttributes::DISABLED_WHILE_ACTIVE)
    }

    /// Parse the rank number out of the subtext ("Rank 3" -> 3, otherwise 0).
    pub fn rank_from_subtext(&self) -> u32 {
        self.subtext
            .strip_prefix("Rank ")
            .and_then(|rank| rank.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// A cast in flight, as referenced by interrupt and proc events.
#[derive(Clone, Debug)]
pub struct CastRef {
    pub spell: Arc<SpellInfo>,
    pub caster: UnitId,
    pub initial_target: Option<UnitId>,
}

impl CastRef {
    pub fn new(spell: Arc<SpellInfo>, caster: UnitId, initial_target: Option<UnitId>) -> Self {
        Self {
            spell,
            caster,
            initial_target,
        }
    }
}
