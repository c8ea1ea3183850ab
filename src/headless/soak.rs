//! Seeded random soak mode
//!
//! Generates a stream of random actions over the run so the aura managers
//! see thousands of interleaved applications, refreshes and removals. The
//! runner checks the slot invariant after every frame.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aura::{SpellId, StandState};

use super::config::{ActionKind, ScenarioAction};

/// Random number generator for the soak generator
///
/// When seeded, the same scenario produces the same action stream.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform index into a collection of `len` items (`len` must be > 0)
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    pub fn random_range_u32(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..max)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

fn pick<'a, T>(rng: &mut GameRng, items: &'a [T]) -> &'a T {
    &items[rng.random_index(items.len())]
}

/// Generate `count` random actions between 0 and `max_ms`, sorted by time.
///
/// Returns an empty list if there are no units or no aura spells to cast.
pub fn generate_random_actions(
    rng: &mut GameRng,
    unit_names: &[String],
    spell_ids: &[SpellId],
    count: usize,
    max_ms: u32,
) -> Vec<ScenarioAction> {
    if unit_names.is_empty() || spell_ids.is_empty() || max_ms == 0 {
        return Vec::new();
    }

    let mut actions: Vec<ScenarioAction> = (0..count)
        .map(|_| {
            let at_ms = rng.random_range_u32(0, max_ms);
            let unit = pick(rng, unit_names).clone();
            let other = pick(rng, unit_names).clone();
            let spell_id = *pick(rng, spell_ids);

            let roll = rng.random_f32();
            let kind = if roll < 0.45 {
                ActionKind::Cast {
                    caster: unit,
                    target: other,
                    spell_id,
                }
            } else if roll < 0.60 {
                ActionKind::Damage {
                    attacker: unit,
                    target: other,
                    amount: rng.random_range_u32(0, 200),
                    melee: rng.random_f32() < 0.5,
                }
            } else if roll < 0.70 {
                ActionKind::Move { unit }
            } else if roll < 0.75 {
                ActionKind::Turn { unit }
            } else if roll < 0.85 {
                let state = if rng.random_f32() < 0.5 {
                    StandState::Sit
                } else {
                    StandState::Stand
                };
                ActionKind::StandState { unit, state }
            } else if roll < 0.93 {
                ActionKind::Cancel { unit, spell_id }
            } else {
                ActionKind::Dispel { unit, caster: other }
            };

            ScenarioAction { at_ms, kind }
        })
        .collect();

    actions.sort_by_key(|action| action.at_ms);
    actions
}
