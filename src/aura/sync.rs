//! Mirrors aura state onto the host's replicated fields.
//!
//! Two field regions are written:
//! - `UNIT_FIELD_AURA + slot`: spell id of the aura in that slot (0 = empty)
//! - `UNIT_FIELD_AURAFLAGS + slot / 8`: 4 bits per slot, `0x9` while visible
//!
//! Passive auras are server-side only and never touch either region.

use bevy::log::trace;

use super::applied::AppliedAura;
use super::constants::{
    AURA_FLAG_VISIBLE, AURA_FLAG_WORD_COUNT, AURA_SLOTS_PER_FLAG_WORD, UNIT_FIELD_AURA,
    UNIT_FIELD_AURAFLAGS,
};
use super::host::AuraHost;
use super::packet::AuraDurationUpdate;
use super::slots::AuraSlot;

/// What a write should publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuraWrite {
    /// Fresh application: duration packet plus field write.
    Apply,
    /// Refresh of an existing aura: duration packet only.
    Refresh,
    /// Removal: duration packet plus field clear.
    Clear,
    /// Object snapshot: field write only.
    Snapshot,
}

impl AuraWrite {
    fn sends_duration(self) -> bool {
        !matches!(self, AuraWrite::Snapshot)
    }

    fn writes_fields(self) -> bool {
        !matches!(self, AuraWrite::Refresh)
    }
}

/// Packed flag words, one per group of 8 slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicationFlags {
    words: [u32; AURA_FLAG_WORD_COUNT],
}

impl ReplicationFlags {
    fn group(slot: AuraSlot) -> usize {
        slot.index() / AURA_SLOTS_PER_FLAG_WORD as usize
    }

    fn shift(slot: AuraSlot) -> u32 {
        ((slot.0 % AURA_SLOTS_PER_FLAG_WORD) as u32) << 2
    }

    pub fn word(&self, group: usize) -> u32 {
        self.words.get(group).copied().unwrap_or(0)
    }

    pub fn word_for(&self, slot: AuraSlot) -> u32 {
        self.word(Self::group(slot))
    }

    pub fn is_set(&self, slot: AuraSlot) -> bool {
        self.word_for(slot) & (AURA_FLAG_VISIBLE << Self::shift(slot)) != 0
    }

    /// Update the nibble for `slot` and return the new value of its word.
    fn update(&mut self, slot: AuraSlot, clear: bool) -> Option<u32> {
        let shift = Self::shift(slot);
        let word = self.words.get_mut(Self::group(slot))?;
        if clear {
            *word &= !(AURA_FLAG_VISIBLE << shift);
        } else {
            *word |= AURA_FLAG_VISIBLE << shift;
        }
        Some(*word)
    }

    /// Publish `aura` to the host according to `write`.
    pub fn write_aura_to_unit(&mut self, host: &mut dyn AuraHost, aura: &AppliedAura, write: AuraWrite) {
        if aura.passive {
            return;
        }
        let Some(slot) = aura.slot else {
            return;
        };

        if write.sends_duration() {
            send_aura_duration(host, aura);
        }
        if !write.writes_fields() {
            return;
        }

        let clear = write == AuraWrite::Clear;
        host.set_uint32(UNIT_FIELD_AURA + slot.index(), if clear { 0 } else { aura.spell_id });
        if let Some(word) = self.update(slot, clear) {
            host.set_uint32(UNIT_FIELD_AURAFLAGS + Self::group(slot), word);
        }
    }
}

/// Send the aura's remaining duration to the controlling player.
pub fn send_aura_duration(host: &mut dyn AuraHost, aura: &AppliedAura) {
    if !host.is_player_controlled() {
        return;
    }
    let Some(slot) = aura.slot else {
        return;
    };

    trace!(
        "Aura duration update: slot {} spell {} remaining {}ms",
        slot,
        aura.spell_id,
        aura.get_duration()
    );
    host.enqueue_packet(AuraDurationUpdate::new(slot.0, aura.get_duration()).into_packet());
}
