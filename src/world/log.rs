//! Aura logging
//!
//! Records every aura transition for inspection and post-run analysis.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aura::{SpellId, UnitId};

/// A single entry in the aura log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuraLogEntry {
    /// Timestamp in simulation time (seconds since start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: AuraLogEventType,
    /// Unit the event happened on
    pub unit: UnitId,
    /// Spell involved, if any
    pub spell_id: Option<SpellId>,
    /// Slot involved, if any
    pub slot: Option<u8>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of aura log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuraLogEventType {
    /// Aura landed in a new slot
    Applied,
    /// Existing aura had its duration reset (and maybe a stack added)
    Refreshed,
    /// Aura ended for any reason
    Removed,
    /// Aura triggered from a combat event
    Proc,
    /// Periodic effect ticked
    Periodic,
    /// Unit was dismounted instead of receiving a mount aura
    Dismounted,
    /// A cast was vetoed by the pre-flight check
    CastVetoed,
    /// Scenario or runner event
    Scenario,
}

/// The aura log resource storing all events
#[derive(Resource, Default, Serialize)]
pub struct AuraLog {
    /// All log entries in chronological order
    pub entries: Vec<AuraLogEntry>,
    /// Current simulation time
    pub sim_time: f32,
}

impl AuraLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sim_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(
        &mut self,
        event_type: AuraLogEventType,
        unit: UnitId,
        spell_id: Option<SpellId>,
        slot: Option<u8>,
        message: String,
    ) {
        self.entries.push(AuraLogEntry {
            timestamp: self.sim_time,
            event_type,
            unit,
            spell_id,
            slot,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: AuraLogEventType) -> Vec<&AuraLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Count entries of a type for one unit and spell
    pub fn count(&self, event_type: AuraLogEventType, unit: UnitId, spell_id: SpellId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type && e.unit == unit && e.spell_id == Some(spell_id))
            .count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&AuraLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Write the log as pretty JSON. Returns the path written.
    pub fn save_to_file(&self, path: &Path) -> Result<String, String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize aura log: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        Ok(path.display().to_string())
    }
}
