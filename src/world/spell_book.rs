//! Data-driven spell catalog
//!
//! Spells are defined in `assets/config/spells.ron` instead of being
//! hardcoded. The loaded `SpellBook` resource is the catalog every aura
//! manager call consults for ranks and exclusivity.
//!
//! ## Usage
//! ```ignore
//! fn my_system(spells: Res<SpellBook>) {
//!     if let Some(corruption) = spells.get(172) {
//!         println!("{} lasts {} ms", corruption.name, corruption.duration_ms);
//!     }
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::aura::{SpellCatalog, SpellEffectType, SpellId, SpellInfo};

/// Default location of the spell definitions.
pub const DEFAULT_SPELL_BOOK_PATH: &str = "assets/config/spells.ron";

/// Spell definitions as written in RON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpellBookConfig {
    pub spells: Vec<SpellInfo>,
    /// Spells within one group displace each other when cast by the same unit
    #[serde(default)]
    pub exclusive_groups: Vec<Vec<SpellId>>,
}

/// Resource containing every known spell.
///
/// Access via `Res<SpellBook>` in systems. An empty book is the default so
/// the plugin can be mounted before a file is loaded.
#[derive(Resource, Default)]
pub struct SpellBook {
    spells: HashMap<SpellId, Arc<SpellInfo>>,
    exclusive_groups: Vec<HashSet<SpellId>>,
}

impl SpellBook {
    /// Build from a parsed config, rejecting inconsistent data.
    pub fn new(config: SpellBookConfig) -> Result<Self, String> {
        let mut spells = HashMap::with_capacity(config.spells.len());
        for spell in config.spells {
            if spell.effects.is_empty() {
                return Err(format!("Spell {} ({}) has no effects", spell.id, spell.name));
            }
            let id = spell.id;
            if spells.insert(id, Arc::new(spell)).is_some() {
                return Err(format!("Duplicate spell id {}", id));
            }
        }

        let mut exclusive_groups = Vec::with_capacity(config.exclusive_groups.len());
        for group in config.exclusive_groups {
            if let Some(unknown) = group.iter().find(|id| !spells.contains_key(id)) {
                return Err(format!("Exclusive group references unknown spell {}", unknown));
            }
            exclusive_groups.push(group.into_iter().collect());
        }

        Ok(Self {
            spells,
            exclusive_groups,
        })
    }

    /// Parse a spell book from RON text.
    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let config: SpellBookConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse spell book: {}", e))?;
        Self::new(config)
    }

    pub fn get(&self, id: SpellId) -> Option<&Arc<SpellInfo>> {
        self.spells.get(&id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// All spell ids in ascending order.
    pub fn ids(&self) -> Vec<SpellId> {
        let mut ids: Vec<SpellId> = self.spells.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of spells with at least one aura-applying effect, ascending.
    pub fn aura_spell_ids(&self) -> Vec<SpellId> {
        let mut ids: Vec<SpellId> = self
            .spells
            .values()
            .filter(|spell| {
                spell
                    .effects
                    .iter()
                    .any(|effect| effect.effect_type == SpellEffectType::ApplyAura)
            })
            .map(|spell| spell.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl SpellCatalog for SpellBook {
    fn are_colliding_auras(&self, spell_a: SpellId, spell_b: SpellId) -> bool {
        spell_a != spell_b
            && self
                .exclusive_groups
                .iter()
                .any(|group| group.contains(&spell_a) && group.contains(&spell_b))
    }
}

/// Load spell definitions from a RON file.
pub fn load_spell_book(path: &Path) -> Result<SpellBook, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let book = SpellBook::from_ron(&contents)
        .map_err(|e| format!("{} ({})", e, path.display()))?;

    info!("Loaded {} spell definitions from {}", book.len(), path.display());
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"(
        spells: [
            (id: 20154, name: "Seal of Righteousness", effects: [(effect_type: ApplyAura, aura_type: Dummy)]),
            (id: 20165, name: "Seal of Light", effects: [(effect_type: ApplyAura, aura_type: Dummy)]),
            (id: 470, name: "Black Stallion", effects: [(effect_type: SummonMount)]),
        ],
        exclusive_groups: [[20154, 20165]],
    )"#;

    #[test]
    fn test_exclusive_groups() {
        let book = SpellBook::from_ron(BOOK).unwrap();
        assert_eq!(book.len(), 3);
        assert!(book.are_colliding_auras(20154, 20165));
        assert!(book.are_colliding_auras(20165, 20154));
        assert!(!book.are_colliding_auras(20154, 20154));
        assert!(!book.are_colliding_auras(20154, 470));
    }

    #[test]
    fn test_aura_spell_ids_skip_non_aura_spells() {
        let book = SpellBook::from_ron(BOOK).unwrap();
        assert_eq!(book.aura_spell_ids(), vec![20154, 20165]);
        assert_eq!(book.ids(), vec![470, 20154, 20165]);
    }

    #[test]
    fn test_rejects_unknown_group_member() {
        let err = SpellBook::from_ron(
            r#"(
                spells: [(id: 1, name: "A", effects: [(effect_type: Dummy)])],
                exclusive_groups: [[1, 2]],
            )"#,
        )
        .err()
        .unwrap();
        assert!(err.contains("unknown spell 2"));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_effects() {
        let duplicate = SpellBook::from_ron(
            r#"(spells: [
                (id: 1, name: "A", effects: [(effect_type: Dummy)]),
                (id: 1, name: "B", effects: [(effect_type: Dummy)]),
            ])"#,
        );
        assert!(duplicate.is_err());

        let empty = SpellBook::from_ron(r#"(spells: [(id: 1, name: "A", effects: [])])"#);
        assert!(empty.is_err());
    }
}
