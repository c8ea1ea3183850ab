//! auramgr - Per-unit aura manager
//!
//! Timed status effects on world units: application and collision rules,
//! slot allocation, interrupts, procs and field replication, plus a bevy
//! integration and a headless scenario runner.
//!
//! This library exposes the core modules for testing and reuse.

pub mod aura;
pub mod cli;
pub mod headless;
pub mod world;

// Re-export commonly used types
pub use aura::{AppliedAura, AuraContext, AuraHost, AuraManager, EffectHandler, SpellCatalog, SpellInfo};
pub use headless::ScenarioConfig;
pub use world::{AuraLog, AuraLogEventType, AuraPlugin, SpellBook};
