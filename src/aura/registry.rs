//! Indexed storage for the auras on one unit.
//!
//! A fixed array with one entry per slot. Lookups are by slot or by linear
//! scan; a slot is free again the moment its aura is taken out.

use smallvec::SmallVec;

use super::applied::{AppliedAura, AuraKey};
use super::constants::AURA_SLOT_COUNT;
use super::slots::{AuraSlot, SlotBand};

/// Snapshot of live aura keys, taken before a scan that may remove auras.
pub type AuraSnapshot = SmallVec<[AuraKey; 16]>;

pub struct AuraRegistry {
    slots: [Option<AppliedAura>; AURA_SLOT_COUNT],
    len: usize,
}

impl Default for AuraRegistry {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            len: 0,
        }
    }
}

impl AuraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_occupied(&self, slot: AuraSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn get(&self, slot: AuraSlot) -> Option<&AppliedAura> {
        self.slots.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: AuraSlot) -> Option<&mut AppliedAura> {
        self.slots.get_mut(slot.index()).and_then(Option::as_mut)
    }

    /// Look up by key; `None` if the slot is empty or holds a different instance.
    pub fn get_by_key(&self, key: AuraKey) -> Option<&AppliedAura> {
        self.get(key.slot).filter(|aura| aura.id == key.id)
    }

    pub fn get_by_key_mut(&mut self, key: AuraKey) -> Option<&mut AppliedAura> {
        self.get_mut(key.slot).filter(|aura| aura.id == key.id)
    }

    pub fn contains_key(&self, key: AuraKey) -> bool {
        self.get_by_key(key).is_some()
    }

    /// Store an aura in the slot it was assigned. Returns whatever was there.
    ///
    /// Auras without a slot or with an out-of-range slot are handed back.
    pub fn insert(&mut self, aura: AppliedAura) -> Option<AppliedAura> {
        let Some(entry) = aura.slot.and_then(|slot| self.slots.get_mut(slot.index())) else {
            return Some(aura);
        };
        let previous = entry.replace(aura);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Take an aura out by key. `None` if it is already gone.
    pub fn take(&mut self, key: AuraKey) -> Option<AppliedAura> {
        if !self.contains_key(key) {
            return None;
        }
        let removed = self.slots[key.slot.index()].take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Active auras in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &AppliedAura> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AppliedAura> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub fn snapshot(&self) -> AuraSnapshot {
        self.iter().filter_map(AppliedAura::key).collect()
    }

    /// Every occupied slot lies in its aura's band and matches the aura's
    /// own slot.
    pub fn check_slot_invariant(&self) -> bool {
        self.slots.iter().enumerate().all(|(index, entry)| match entry {
            None => true,
            Some(aura) => {
                let slot = AuraSlot(index as u8);
                aura.slot == Some(slot) && slot.band() == Some(SlotBand::for_aura(aura))
            }
        })
    }
}
