//! Headless mode for scripted and soak testing
//!
//! Runs aura scenarios without any graphical output, suitable for automated
//! testing and regression runs.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless scenario
//! cargo run --release -- --headless scenario.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "units": [
//!     {"name": "hero", "kind": "Player"},
//!     {"name": "wolf", "kind": "Creature"}
//!   ],
//!   "actions": [
//!     {"at_ms": 0, "action": "cast", "caster": "hero", "target": "wolf", "spell_id": 172},
//!     {"at_ms": 1500, "action": "damage", "attacker": "wolf", "target": "hero", "amount": 20}
//!   ],
//!   "max_duration_secs": 20,
//!   "random_seed": 42,
//!   "random_events": 0
//! }
//! ```

pub mod config;
pub mod runner;
pub mod soak;

pub use config::{ActionKind, ScenarioAction, ScenarioConfig, UnitConfig};
pub use runner::{run_headless_scenario, RunOptions, ScenarioResult, UnitResult};
pub use soak::GameRng;
