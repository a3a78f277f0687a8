//! Run Configuration Module
//!
//! Input handling, trend smoothing and report output settings loaded from
//! TOML. Threshold tables are fixed and never configurable.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `EQUIPMENT_HEALTH_CONFIG` environment variable (path to TOML file)
//! 3. `health_config.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! The configuration is an explicit value; load it once and pass it down:
//!
//! ```ignore
//! let config = HealthConfig::load_with_override(args.config.as_deref())?;
//! let table = SensorTable::load(&args.file, &config.input.load_config())?;
//! ```

mod health_config;
pub mod defaults;
pub mod validation;

pub use health_config::*;
