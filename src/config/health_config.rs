//! Health Configuration - run settings as operator-tunable TOML values
//!
//! Each section implements `Default`, so a missing file or a partial file
//! behaves exactly like the built-in settings for everything it leaves out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::sensors::LoadConfig;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl HealthConfig {
    /// Load the run configuration.
    ///
    /// An explicit `path` must load; otherwise `$EQUIPMENT_HEALTH_CONFIG`,
    /// then `./health_config.toml`, then the built-in defaults.
    pub fn load_with_override(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(defaults::CONFIG_ENV_VAR).ok();
        Self::resolve(path, env_path.as_deref(), Path::new(".")).map(|(config, _)| config)
    }

    /// Resolve the config from explicit inputs, reporting where it came from.
    ///
    /// Candidate files that are missing or fail to load are skipped with a
    /// warning; only an explicit path is fatal.
    pub fn resolve(
        explicit: Option<&Path>,
        env_path: Option<&str>,
        working_dir: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(p) = explicit {
            let source = ConfigSource::CommandLine(p.to_path_buf());
            let config = Self::load_from_file(p)?;
            info!(source = %source, "Loaded config");
            return Ok((config, source));
        }

        let candidates = env_path
            .map(|p| ConfigSource::Environment(PathBuf::from(p)))
            .into_iter()
            .chain([ConfigSource::WorkingDirectory(
                working_dir.join(defaults::LOCAL_CONFIG_FILE),
            )]);

        for source in candidates {
            let Some(path) = source.path() else { continue };
            if !path.exists() {
                if matches!(source, ConfigSource::Environment(_)) {
                    warn!(source = %source, "Config file does not exist, falling back");
                }
                continue;
            }
            match Self::load_from_file(path) {
                Ok(config) => {
                    info!(source = %source, "Loaded config");
                    return Ok((config, source));
                }
                Err(e) => warn!(source = %source, error = %e, "Failed to load config, falling back"),
            }
        }

        info!("No config file found, using built-in defaults");
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the config to a file (used for starter configs).
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate all values; suspicious-but-legal values are logged as warnings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_value_ranges(self);
        for w in &warnings {
            warn!(field = %w.field, "{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Config Source
// ============================================================================

/// Where a run's configuration was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    WorkingDirectory(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::CommandLine(p) | Self::Environment(p) | Self::WorkingDirectory(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommandLine(p) => write!(f, "--config {}", p.display()),
            Self::Environment(p) => write!(f, "${} ({})", defaults::CONFIG_ENV_VAR, p.display()),
            Self::WorkingDirectory(p) => write!(f, "{}", p.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// [input]
// ============================================================================

/// How raw sensor tables are filtered and normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Drop rows missing hours, temperature, vibration or pressure
    #[serde(default = "default_true")]
    pub drop_incomplete: bool,
    /// Round loaded values
    #[serde(default = "default_true")]
    pub round_values: bool,
    /// Decimal places used when `round_values` is set
    #[serde(default = "default_round_decimals")]
    pub round_decimals: u32,
    /// Sort readings by operating hours before analysis
    #[serde(default)]
    pub sort_by_hours: bool,
}

const fn default_true() -> bool {
    true
}
const fn default_round_decimals() -> u32 {
    defaults::ROUND_DECIMALS
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drop_incomplete: true,
            round_values: true,
            round_decimals: default_round_decimals(),
            sort_by_hours: false,
        }
    }
}

impl InputConfig {
    /// Loader settings derived from this section.
    pub const fn load_config(&self) -> LoadConfig {
        LoadConfig {
            drop_incomplete: self.drop_incomplete,
            round_decimals: if self.round_values {
                Some(self.round_decimals)
            } else {
                None
            },
        }
    }
}

// ============================================================================
// [trend]
// ============================================================================

/// LOWESS parameters for the trend view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Fraction of the series in each local fit, in (0, 1]
    #[serde(default = "default_trend_frac")]
    pub frac: f64,
    /// Robustifying passes
    #[serde(default = "default_trend_iterations")]
    pub iterations: u32,
}

const fn default_trend_frac() -> f64 {
    defaults::TREND_FRAC
}
const fn default_trend_iterations() -> u32 {
    defaults::TREND_ITERATIONS
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            frac: default_trend_frac(),
            iterations: default_trend_iterations(),
        }
    }
}

// ============================================================================
// [report]
// ============================================================================

/// Output encoding of the dashboard report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Report layout and export settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// One summary per component instead of one for the whole table
    #[serde(default)]
    pub by_component: bool,
    /// Directory receiving the multi-page export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}
