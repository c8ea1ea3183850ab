//! JSON configuration parsing for headless mode
//!
//! A scenario names its units and lists timed actions against them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::aura::{SpellId, StandState, UnitKind};

/// Headless scenario loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Units taking part, referenced by name from actions
    pub units: Vec<UnitConfig>,
    /// Timed actions, executed in `at_ms` order
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
    /// Spell definitions to load (default: assets/config/spells.ron)
    #[serde(default)]
    pub spells_path: Option<String>,
    /// Custom output path for the aura log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Simulated time before the run stops (default: 60)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Simulated milliseconds per frame (default: 100)
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,
    /// Random seed for the soak generator
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Number of random events to generate in addition to `actions`
    #[serde(default)]
    pub random_events: usize,
}

fn default_max_duration() -> f32 {
    60.0
}

/// Largest frame step bevy's virtual clock passes through unclamped.
pub const MAX_FRAME_MS: u32 = 250;

fn default_frame_ms() -> u32 {
    100
}

/// One unit in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,
    pub kind: UnitKind,
    /// Items in the backpack: (slot, spell cast on use)
    #[serde(default)]
    pub items: Vec<(u8, SpellId)>,
}

/// An action scheduled at a point in simulated time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAction {
    /// Milliseconds since the start of the run
    pub at_ms: u32,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// What a scenario action does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    Cast {
        caster: String,
        target: String,
        spell_id: SpellId,
    },
    Apply {
        caster: String,
        target: String,
        spell_id: SpellId,
    },
    Damage {
        attacker: String,
        target: String,
        amount: u32,
        #[serde(default)]
        melee: bool,
    },
    Move {
        unit: String,
    },
    Turn {
        unit: String,
    },
    StandState {
        unit: String,
        state: StandState,
    },
    Cancel {
        unit: String,
        spell_id: SpellId,
    },
    Dispel {
        unit: String,
        caster: String,
    },
    Kill {
        unit: String,
        #[serde(default)]
        killer: Option<String>,
    },
    UseItem {
        unit: String,
        bag: u8,
        slot: u8,
    },
}

impl ActionKind {
    /// Unit names this action refers to
    pub fn unit_names(&self) -> Vec<&str> {
        match self {
            ActionKind::Cast { caster, target, .. } | ActionKind::Apply { caster, target, .. } => {
                vec![caster.as_str(), target.as_str()]
            }
            ActionKind::Damage { attacker, target, .. } => vec![attacker.as_str(), target.as_str()],
            ActionKind::Dispel { unit, caster } => vec![unit.as_str(), caster.as_str()],
            ActionKind::Kill { unit, killer } => {
                let mut names = vec![unit.as_str()];
                names.extend(killer.as_deref());
                names
            }
            ActionKind::Move { unit }
            | ActionKind::Turn { unit }
            | ActionKind::StandState { unit, .. }
            | ActionKind::Cancel { unit, .. }
            | ActionKind::UseItem { unit, .. } => vec![unit.as_str()],
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_json(&contents)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: ScenarioConfig = serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.units.is_empty() {
            return Err("scenario must have at least one unit".to_string());
        }

        let mut names = HashSet::new();
        for unit in &self.units {
            if !names.insert(unit.name.as_str()) {
                return Err(format!("duplicate unit name '{}'", unit.name));
            }
        }

        for action in &self.actions {
            for name in action.kind.unit_names() {
                if !names.contains(name) {
                    return Err(format!("action at {} ms references unknown unit '{}'", action.at_ms, name));
                }
            }
        }

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        // Virtual time clamps larger steps
        if self.frame_ms == 0 || self.frame_ms > MAX_FRAME_MS {
            return Err(format!("frame_ms must be between 1 and {}", MAX_FRAME_MS));
        }

        Ok(())
    }

    /// Actions sorted by time; ties keep file order
    pub fn sorted_actions(&self) -> Vec<ScenarioAction> {
        let mut actions = self.actions.clone();
        actions.sort_by_key(|action| action.at_ms);
        actions
    }
}
