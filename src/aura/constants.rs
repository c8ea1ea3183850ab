//! Aura Constants
//!
//! Slot band layout, replicated field offsets and other fixed numbers shared
//! by the aura manager and the network sync.

// ============================================================================
// Slot Bands
// ============================================================================

/// First slot of the beneficial band (buffs).
pub const AURA_SLOT_POSITIVE_AURA_START: u8 = 0;

/// First slot of the harmful band (debuffs).
pub const AURA_SLOT_HARMFUL_AURA_START: u8 = 24;

/// First slot of the passive band. Passive auras are never replicated.
pub const AURA_SLOT_PASSIVE_AURA_START: u8 = 40;

/// One past the last usable slot.
pub const AURA_SLOT_END: u8 = 56;

/// Total number of slots, used to size the registry.
pub const AURA_SLOT_COUNT: usize = AURA_SLOT_END as usize;

// ============================================================================
// Replicated Fields
// ============================================================================

/// Slots packed into a single aura flag word (4 bits each).
pub const AURA_SLOTS_PER_FLAG_WORD: u8 = 8;

/// Number of aura flag words needed to cover every slot.
pub const AURA_FLAG_WORD_COUNT: usize =
    AURA_SLOT_COUNT.div_ceil(AURA_SLOTS_PER_FLAG_WORD as usize);

/// Bit pattern OR'd into a slot's nibble while it holds a visible aura.
pub const AURA_FLAG_VISIBLE: u32 = 0x9;

/// First replicated field holding a per-slot spell id.
pub const UNIT_FIELD_AURA: usize = 0x30;

/// First replicated field holding packed per-slot aura flags.
pub const UNIT_FIELD_AURAFLAGS: usize = UNIT_FIELD_AURA + AURA_SLOT_COUNT;

/// Total replicated unit fields the host needs to expose for auras.
pub const UNIT_FIELD_AURA_END: usize = UNIT_FIELD_AURAFLAGS + AURA_FLAG_WORD_COUNT;

// ============================================================================
// Gameplay
// ============================================================================

/// Flat threat added to a creature when a harmful aura lands on it.
pub const AURA_APPLICATION_THREAT: f32 = 10.0;

/// Remaining duration reported for auras without a duration.
pub const PERMANENT_DURATION: i32 = -1;

/// Proc charge value meaning "unlimited".
pub const UNLIMITED_PROC_CHARGES: i32 = -1;
