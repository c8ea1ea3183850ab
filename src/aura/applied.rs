//! A single aura instance attached to a unit.

use std::sync::Arc;

use super::constants::{PERMANENT_DURATION, UNLIMITED_PROC_CHARGES};
use super::flags::{InterruptFlags, ProcFlags};
use super::host::{CasterRef, UnitId};
use super::slots::AuraSlot;
use super::spell::{AuraType, SpellId, SpellInfo};

/// Per-manager instance id. Distinguishes an aura from a later one that
/// reuses the same slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuraId(pub u64);

/// Handle to a live aura: where it sits and which instance it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AuraKey {
    pub slot: AuraSlot,
    pub id: AuraId,
}

/// Countdown for periodic effects. The manager only advances it; what a
/// tick does is up to the effect handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodicTimer {
    pub interval_ms: u32,
    pub elapsed_ms: u32,
}

impl PeriodicTimer {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0,
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.interval_ms > 0
    }

    /// Advance by `elapsed_ms` and return how many ticks came due.
    pub fn advance(&mut self, elapsed_ms: u32) -> u32 {
        if !self.is_periodic() {
            return 0;
        }
        self.elapsed_ms += elapsed_ms;
        let ticks = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;
        ticks
    }
}

/// An aura on a unit.
#[derive(Clone, Debug)]
pub struct AppliedAura {
    pub id: AuraId,
    pub spell_id: SpellId,
    pub effect_index: u8,
    pub caster: CasterRef,
    pub target: UnitId,
    pub spell: Arc<SpellInfo>,

    pub aura_type: AuraType,
    pub harmful: bool,
    pub passive: bool,

    pub can_stack: bool,
    pub applied_stacks: u32,
    pub max_stacks: u32,

    /// Full duration in milliseconds, `PERMANENT_DURATION` if none
    pub duration_ms: i32,
    pub remaining_ms: i32,
    pub periodic: PeriodicTimer,

    pub interrupt_flags: InterruptFlags,
    pub proc_flags: ProcFlags,
    /// Remaining procs; `UNLIMITED_PROC_CHARGES` never runs out
    pub proc_charges: i32,

    /// Assigned once the registry accepts the aura
    pub slot: Option<AuraSlot>,
}

impl AppliedAura {
    /// Build a candidate aura from one effect of a spell.
    ///
    /// Returns `None` if the spell has no effect at `effect_index`.
    pub fn new(
        caster: CasterRef,
        spell: Arc<SpellInfo>,
        effect_index: usize,
        target: UnitId,
    ) -> Option<Self> {
        let effect = spell.effect(effect_index)?;
        let effect_index = u8::try_from(effect_index).ok()?;

        let proc_charges = if spell.proc_charges == 0 {
            UNLIMITED_PROC_CHARGES
        } else {
            i32::try_from(spell.proc_charges).unwrap_or(i32::MAX)
        };
        let duration_ms = if spell.duration_ms > 0 {
            spell.duration_ms
        } else {
            PERMANENT_DURATION
        };

        Some(Self {
            id: AuraId::default(),
            spell_id: spell.id,
            effect_index,
            caster,
            target,
            aura_type: effect.aura_type,
            harmful: spell.harmful,
            passive: spell.is_passive(),
            can_stack: spell.stack_amount > 1,
            applied_stacks: 1,
            max_stacks: spell.stack_amount.max(1),
            duration_ms,
            remaining_ms: duration_ms,
            periodic: PeriodicTimer::new(effect.amplitude_ms),
            interrupt_flags: spell.aura_interrupt_flags,
            proc_flags: spell.proc_flags,
            proc_charges,
            slot: None,
            spell,
        })
    }

    pub fn key(&self) -> Option<AuraKey> {
        self.slot.map(|slot| AuraKey { slot, id: self.id })
    }

    pub fn has_duration(&self) -> bool {
        self.duration_ms > 0
    }

    /// Remaining duration as reported to clients.
    pub fn get_duration(&self) -> i32 {
        if self.has_duration() {
            self.remaining_ms
        } else {
            PERMANENT_DURATION
        }
    }

    pub fn is_expired(&self) -> bool {
        self.has_duration() && self.remaining_ms <= 0
    }

    /// Reset the countdown to the full duration.
    pub fn start_duration(&mut self) {
        self.remaining_ms = self.duration_ms;
    }

    /// Advance the aura's clocks. Returns the number of periodic ticks due.
    ///
    /// Periodic time never runs past the end of the aura, so the final tick
    /// lands exactly on expiry.
    pub fn advance(&mut self, elapsed_ms: u32) -> u32 {
        let step = if self.has_duration() {
            let step = elapsed_ms.min(self.remaining_ms.max(0) as u32);
            self.remaining_ms -= step as i32;
            step
        } else {
            elapsed_ms
        };
        self.periodic.advance(step)
    }
}
