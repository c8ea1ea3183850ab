//! Aura Manager - application pipeline
//!
//! Decides whether a new aura may land on the unit and resolves it against
//! what is already there:
//!
//! 1. Acceptance: duplicate shapeshift, stronger similar aura already active
//! 2. Collisions: mount special case, weaker ranks, exclusivity groups,
//!    shapeshift forms (resolved by removing the old aura)
//! 3. Harmful side effects: threat, "negative aura applied" interrupts
//! 4. Refresh an existing instance or take a new slot
//! 5. Effect handler, then replication
//!
//! Interrupts, procs and removal live in their own modules as further
//! `impl AuraManager` blocks.

use std::sync::Arc;

use bevy::log::{debug, warn};
use bevy::prelude::Component;
use smallvec::SmallVec;

use super::applied::{AppliedAura, AuraId, AuraKey};
use super::constants::AURA_APPLICATION_THREAT;
use super::flags::SpellAttributesEx;
use super::host::{AuraContext, AuraHost, CasterRef, SpellCatalog, UnitId, UnitKind};
use super::interrupts::AuraInterruptEvent;
use super::registry::AuraRegistry;
use super::slots::{next_free_slot, AuraSlot};
use super::spell::{AuraType, SpellEffectType, SpellId, SpellInfo};
use super::sync::{send_aura_duration, AuraWrite, ReplicationFlags};

/// Auras on one unit, plus the replicated flag words that mirror them.
#[derive(Component, Default)]
pub struct AuraManager {
    pub(crate) registry: AuraRegistry,
    pub(crate) replication: ReplicationFlags,
    next_id: u64,
}

impl AuraManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &AuraRegistry {
        &self.registry
    }

    pub fn replication(&self) -> &ReplicationFlags {
        &self.replication
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn get(&self, slot: AuraSlot) -> Option<&AppliedAura> {
        self.registry.get(slot)
    }

    pub fn auras(&self) -> impl Iterator<Item = &AppliedAura> {
        self.registry.iter()
    }

    fn next_aura_id(&mut self) -> AuraId {
        self.next_id += 1;
        AuraId(self.next_id)
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Build an aura from one effect of `spell` and try to apply it.
    pub fn apply_spell_effect_aura(
        &mut self,
        ctx: &mut AuraContext,
        caster: CasterRef,
        spell: Arc<SpellInfo>,
        effect_index: usize,
    ) -> Option<AuraSlot> {
        let target = ctx.host.unit_id();
        let aura = AppliedAura::new(caster, spell, effect_index, target)?;
        self.add_aura(ctx, aura)
    }

    /// Run the full application pipeline for a candidate aura.
    ///
    /// Returns the slot the aura (or the aura it refreshed) occupies, or
    /// `None` if the candidate was rejected. Rejection is silent.
    pub fn add_aura(&mut self, ctx: &mut AuraContext, mut aura: AppliedAura) -> Option<AuraSlot> {
        if !self.can_apply_aura(ctx.catalog, &aura) {
            debug!("Rejected aura {} (effect {}): stronger or duplicate aura active", aura.spell_id, aura.effect_index);
            return None;
        }
        if !self.remove_colliding_effects(ctx, &aura) {
            debug!("Rejected aura {}: dismounted instead", aura.spell_id);
            return None;
        }

        if aura.harmful {
            // Threat for creature targets against unit casters
            if aura.caster.kind.is_unit()
                && ctx.host.unit_kind() == UnitKind::Creature
                && ctx.catalog.generates_threat(&aura.spell)
            {
                ctx.host.add_threat(aura.caster.id, AURA_APPLICATION_THREAT);
            }

            let event = AuraInterruptEvent {
                negative_aura_applied: true,
                ..Default::default()
            };
            self.check_aura_interrupts(ctx, &event);
        }

        let refresh_key = self
            .get_similar_applied_auras(ctx.catalog, &aura, false, false)
            .first()
            .copied();

        if let Some(existing) = refresh_key.and_then(|key| self.registry.get_by_key_mut(key)) {
            if aura.can_stack && existing.applied_stacks < existing.max_stacks {
                existing.applied_stacks += 1;
            }
            existing.start_duration();

            // The candidate is never stored; it carries the refreshed state
            // to the effect handler and the duration update.
            aura.applied_stacks = existing.applied_stacks;
            aura.slot = existing.slot;
            aura.id = existing.id;

            ctx.effects.apply(&aura, &mut *ctx.host);
            self.replication.write_aura_to_unit(&mut *ctx.host, &aura, AuraWrite::Refresh);
            debug!("Refreshed aura {} in slot {:?} ({} stacks)", aura.spell_id, aura.slot, aura.applied_stacks);
            return aura.slot;
        }

        let slot = next_free_slot(&self.registry, &aura);
        aura.slot = Some(slot);
        aura.id = self.next_aura_id();
        if let Some(displaced) = self.registry.insert(aura) {
            warn!(
                "Aura slot band exhausted: spell {} overwrote spell {} in slot {}",
                self.registry.get(slot).map_or(0, |a| a.spell_id),
                displaced.spell_id,
                slot
            );
        }

        let stored = self.registry.get(slot)?;
        ctx.effects.apply(stored, &mut *ctx.host);
        self.replication.write_aura_to_unit(&mut *ctx.host, stored, AuraWrite::Apply);
        debug!("Applied aura {} in slot {}", stored.spell_id, slot);
        Some(slot)
    }

    /// Acceptance check; never mutates anything.
    pub fn can_apply_aura(&self, catalog: &dyn SpellCatalog, aura: &AppliedAura) -> bool {
        if aura.aura_type == AuraType::ModShapeshift && self.has_aura_by_spell_id(aura.spell_id) {
            return false;
        }

        let new_rank = catalog.rank_of(&aura.spell);
        !self
            .get_similar_applied_auras(catalog, aura, true, true)
            .into_iter()
            .filter_map(|key| self.registry.get_by_key(key))
            .any(|applied| catalog.rank_of(&applied.spell) > new_rank)
    }

    /// Pre-flight check for a whole cast, run before any of its effects land.
    pub fn are_spell_effects_applicable(
        &self,
        catalog: &dyn SpellCatalog,
        caster: CasterRef,
        spell: &Arc<SpellInfo>,
        target: UnitId,
    ) -> bool {
        for (index, effect) in spell.effects.iter().enumerate() {
            // Mounting by effect while a mount aura is active should dismount,
            // but the mount aura is interrupted by the cast first. Block it.
            if effect.effect_type == SpellEffectType::SummonMount
                && self.get_auras_by_type(AuraType::Mounted).next().is_some()
            {
                return false;
            }

            if effect.effect_type != SpellEffectType::ApplyAura {
                continue;
            }

            let Some(aura) = AppliedAura::new(caster, Arc::clone(spell), index, target) else {
                continue;
            };
            if !self.can_apply_aura(catalog, &aura) {
                return false;
            }
        }
        true
    }

    /// Remove everything the candidate displaces.
    ///
    /// Returns `false` only for the mount special case, where the candidate
    /// dismounts the unit instead of landing.
    fn remove_colliding_effects(&mut self, ctx: &mut AuraContext, aura: &AppliedAura) -> bool {
        if aura.aura_type == AuraType::Mounted
            && ctx.host.is_mounted()
            && self.get_auras_by_type(AuraType::Mounted).next().is_none()
        {
            ctx.effects.dismount(&mut *ctx.host);
            return false;
        }

        let new_rank = ctx.catalog.rank_of(&aura.spell);

        for key in self.registry.snapshot() {
            let Some(applied) = self.registry.get_by_key(key) else {
                continue;
            };

            // Weaker candidates were already turned away by can_apply_aura
            let is_similar_and_weaker = applied.effect_index == aura.effect_index
                && applied.spell.name == aura.spell.name
                && ctx.catalog.rank_of(&applied.spell) < new_rank;
            // Paladin seals, warlock curses
            let are_exclusive = ctx.catalog.are_colliding_auras(aura.spell_id, applied.spell_id);
            // Buffs are unique regardless of source
            let is_unique =
                applied.spell.attributes_ex.contains(SpellAttributesEx::AURA_UNIQUE) || !aura.harmful;
            let is_same_spell_other_effect =
                aura.spell_id == applied.spell_id && aura.effect_index != applied.effect_index;
            let casters_are_same = applied.caster.id == aura.caster.id;
            let both_shapeshift = applied.aura_type == AuraType::ModShapeshift
                && aura.aura_type == AuraType::ModShapeshift;

            let displaced = (is_similar_and_weaker && (is_unique || (casters_are_same && !applied.can_stack)))
                || (are_exclusive && casters_are_same && !is_same_spell_other_effect);

            if displaced || both_shapeshift {
                self.remove_aura(ctx, key, false);
            }
        }

        true
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance every aura by `elapsed_ms`, fire periodic ticks and remove
    /// expired auras.
    pub fn update(&mut self, ctx: &mut AuraContext, elapsed_ms: u32) {
        for key in self.registry.snapshot() {
            let Some(aura) = self.registry.get_by_key_mut(key) else {
                continue;
            };

            let ticks = aura.advance(elapsed_ms);
            for _ in 0..ticks {
                ctx.effects.periodic_tick(aura, &mut *ctx.host);
            }

            if aura.is_expired() {
                self.remove_aura(ctx, key, false);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn has_aura_by_spell_id(&self, spell_id: SpellId) -> bool {
        self.registry.iter().any(|aura| aura.spell_id == spell_id)
    }

    pub fn get_auras_by_spell_id(&self, spell_id: SpellId) -> impl Iterator<Item = &AppliedAura> {
        self.registry.iter().filter(move |aura| aura.spell_id == spell_id)
    }

    pub fn get_auras_by_type(&self, aura_type: AuraType) -> impl Iterator<Item = &AppliedAura> {
        self.registry.iter().filter(move |aura| aura.aura_type == aura_type)
    }

    /// Auras on the same effect index with the same spell name.
    ///
    /// - `accept_all_ranks = false` narrows to the exact same spell id
    /// - `accept_all_sources = false` narrows to the same caster
    pub fn get_similar_applied_auras(
        &self,
        catalog: &dyn SpellCatalog,
        aura: &AppliedAura,
        accept_all_ranks: bool,
        accept_all_sources: bool,
    ) -> SmallVec<[AuraKey; 4]> {
        let new_rank = catalog.rank_of(&aura.spell);

        self.registry
            .iter()
            .filter(|applied| applied.effect_index == aura.effect_index)
            .filter(|applied| accept_all_sources || applied.caster.id == aura.caster.id)
            .filter(|applied| applied.spell.name == aura.spell.name)
            .filter(|applied| {
                accept_all_ranks
                    || (applied.spell_id == aura.spell_id && catalog.rank_of(&applied.spell) == new_rank)
            })
            .filter_map(AppliedAura::key)
            .collect()
    }

    // ========================================================================
    // Replication
    // ========================================================================

    /// Write the fields of every active aura, e.g. for a create-object
    /// update. No duration packets are sent.
    pub fn build_update(&mut self, host: &mut dyn AuraHost) {
        for aura in self.registry.iter() {
            self.replication.write_aura_to_unit(host, aura, AuraWrite::Snapshot);
        }
    }

    /// Resend the remaining duration of every active, visible aura.
    pub fn send_all_durations(&self, host: &mut dyn AuraHost) {
        for aura in self.registry.iter().filter(|aura| !aura.passive) {
            send_aura_duration(host, aura);
        }
    }
}
