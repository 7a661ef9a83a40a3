//! Orchestrator Configuration Module
//!
//! Per-deployment configuration loaded from TOML. The resolved
//! [`OrchestratorConfig`] is passed explicitly to every pipeline component;
//! there is no global config and no dependence on the process working
//! directory once a config has been loaded.
//!
//! ## Loading Order
//!
//! 1. `WELL_SCHEMATIC_CONFIG` environment variable (path to TOML file)
//! 2. `well_schematic.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! ```ignore
//! let config = OrchestratorConfig::load();
//! config.validate()?;
//! let orchestrator = Orchestrator::new(config);
//! ```

mod orchestrator_config;
pub mod defaults;

pub use orchestrator_config::*;
