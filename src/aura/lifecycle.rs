//! Removal and bulk teardown.
//!
//! Every path that ends an aura (expiry, collision, interrupt, proc
//! exhaustion, death, dispel, cancel) funnels through `remove_aura`, which
//! is a no-op for auras that are already gone.

use bevy::log::debug;

use super::applied::{AppliedAura, AuraKey};
use super::flags::SpellAttributes;
use super::host::{AuraContext, UnitId};
use super::manager::AuraManager;
use super::registry::AuraSnapshot;
use super::spell::{AuraType, SpellId};
use super::sync::AuraWrite;

impl AuraManager {
    /// Tear down one aura.
    ///
    /// Returns `false` without side effects if `key` no longer names a live
    /// aura, so overlapping removal requests are harmless.
    pub fn remove_aura(&mut self, ctx: &mut AuraContext, key: AuraKey, canceled: bool) -> bool {
        let Some(aura) = self.registry.take(key) else {
            return false;
        };

        ctx.effects.remove(&aura, &mut *ctx.host);
        // Area auras and channels are tied to their cast; end it with the aura
        ctx.host.remove_cast(&aura.spell, canceled);
        if aura.spell.unlock_cooldown_on_trigger() {
            ctx.host.unlock_spell_cooldown(aura.spell_id);
        }
        self.replication.write_aura_to_unit(&mut *ctx.host, &aura, AuraWrite::Clear);

        debug!(
            "Removed aura {} from slot {}{}",
            aura.spell_id,
            key.slot,
            if canceled { " (canceled)" } else { "" }
        );
        true
    }

    fn remove_matching(
        &mut self,
        ctx: &mut AuraContext,
        canceled: bool,
        predicate: impl Fn(&AppliedAura) -> bool,
    ) -> usize {
        let doomed: AuraSnapshot = self
            .registry
            .iter()
            .filter(|aura| predicate(aura))
            .filter_map(AppliedAura::key)
            .collect();

        doomed
            .into_iter()
            .filter(|key| self.remove_aura(ctx, *key, canceled))
            .count()
    }

    pub fn remove_all_auras(&mut self, ctx: &mut AuraContext) -> usize {
        self.remove_matching(ctx, false, |_| true)
    }

    pub fn remove_auras_by_type(&mut self, ctx: &mut AuraContext, aura_type: AuraType) -> usize {
        self.remove_matching(ctx, false, |aura| aura.aura_type == aura_type)
    }

    /// Strip everything except passives and auras that survive death.
    pub fn handle_death(&mut self, ctx: &mut AuraContext) -> usize {
        let persistent = SpellAttributes::ALLOW_CAST_WHILE_DEAD | SpellAttributes::PASSIVE;
        self.remove_matching(ctx, false, |aura| !aura.spell.attributes.intersects(persistent))
    }

    /// Remove every harmful aura `caster` put on this unit.
    pub fn remove_harmful_auras_by_caster(&mut self, ctx: &mut AuraContext, caster: UnitId) -> usize {
        self.remove_matching(ctx, false, |aura| aura.harmful && aura.caster.id == caster)
    }

    pub fn cancel_auras_by_spell_id(&mut self, ctx: &mut AuraContext, spell_id: SpellId) -> usize {
        self.remove_matching(ctx, true, |aura| aura.spell_id == spell_id)
    }

    /// A player right-clicked an aura off.
    ///
    /// Refused if any instance is harmful or uncancelable, or if the spell
    /// only has passive parts. Returns whether the cancel went through.
    pub fn handle_player_cancel_aura_request(&mut self, ctx: &mut AuraContext, spell_id: SpellId) -> bool {
        let mut is_passive = true;
        for aura in self.get_auras_by_spell_id(spell_id) {
            if !aura.passive {
                is_passive = false;
            }
            if aura.harmful || aura.spell.attributes.contains(SpellAttributes::CANT_CANCEL) {
                debug!("Refused cancel of aura {}: harmful or not cancelable", spell_id);
                return false;
            }
        }
        if is_passive {
            return false;
        }

        self.cancel_auras_by_spell_id(ctx, spell_id);
        true
    }
}
