//! System-wide default constants.
//!
//! Centralises magic numbers used by the loader, the trend smoother and the
//! configuration layer. Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Discovery
// ============================================================================

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "EQUIPMENT_HEALTH_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "health_config.toml";

// ============================================================================
// Loader
// ============================================================================

/// Decimal places kept when rounding loaded values.
pub const ROUND_DECIMALS: u32 = 3;

/// Largest accepted `round_decimals`; beyond this f64 rounding is meaningless.
pub const MAX_ROUND_DECIMALS: u32 = 9;

// ============================================================================
// Trend Smoothing
// ============================================================================

/// Fraction of the series used for each local LOWESS fit.
pub const TREND_FRAC: f64 = 0.02;

/// Robustifying LOWESS passes.
pub const TREND_ITERATIONS: u32 = 3;

/// Upper bound on robustifying passes.
pub const MAX_TREND_ITERATIONS: u32 = 10;

/// Above this fraction the trend is mostly a straight line (warning only).
pub const TREND_FRAC_HEAVY: f64 = 0.5;

// ============================================================================
// Presentation
// ============================================================================

/// Width of text gauge bars (characters).
pub const GAUGE_BAR_WIDTH: usize = 30;
