//! Slot bands and the slot allocator.

use std::fmt;
use std::ops::Range;

use super::applied::AppliedAura;
use super::constants::{
    AURA_SLOT_END, AURA_SLOT_HARMFUL_AURA_START, AURA_SLOT_PASSIVE_AURA_START,
    AURA_SLOT_POSITIVE_AURA_START,
};
use super::registry::AuraRegistry;

/// Stable index of an aura in the registry and in the replicated fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuraSlot(pub u8);

impl AuraSlot {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn band(self) -> Option<SlotBand> {
        SlotBand::ALL
            .into_iter()
            .find(|band| band.range().contains(&self.0))
    }
}

impl fmt::Display for AuraSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three disjoint slot ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotBand {
    Beneficial,
    Harmful,
    Passive,
}

impl SlotBand {
    pub const ALL: [SlotBand; 3] = [SlotBand::Beneficial, SlotBand::Harmful, SlotBand::Passive];

    /// Band an aura belongs to. Passive wins over harmful.
    pub fn for_aura(aura: &AppliedAura) -> SlotBand {
        if aura.passive {
            SlotBand::Passive
        } else if aura.harmful {
            SlotBand::Harmful
        } else {
            SlotBand::Beneficial
        }
    }

    pub fn range(self) -> Range<u8> {
        match self {
            SlotBand::Beneficial => AURA_SLOT_POSITIVE_AURA_START..AURA_SLOT_HARMFUL_AURA_START,
            SlotBand::Harmful => AURA_SLOT_HARMFUL_AURA_START..AURA_SLOT_PASSIVE_AURA_START,
            SlotBand::Passive => AURA_SLOT_PASSIVE_AURA_START..AURA_SLOT_END,
        }
    }

    pub fn first(self) -> AuraSlot {
        AuraSlot(self.range().start)
    }
}

/// First free slot in the aura's band.
///
/// When the band is full this returns the band's first slot even though it
/// is occupied; the caller then overwrites whatever sits there.
pub fn next_free_slot(registry: &AuraRegistry, aura: &AppliedAura) -> AuraSlot {
    let band = SlotBand::for_aura(aura);
    band.range()
        .map(AuraSlot)
        .find(|slot| !registry.is_occupied(*slot))
        .unwrap_or_else(|| band.first())
}
