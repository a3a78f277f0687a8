//! Config validation: unknown-key detection with Levenshtein suggestions
//! and value range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Unknown keys never break a config.

use std::collections::HashSet;

use super::defaults;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `HealthConfig`.
///
/// Maintained by hand to match the structs in `health_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [input]
        "input",
        "input.drop_incomplete",
        "input.round_values",
        "input.round_decimals",
        "input.sort_by_hours",
        // [trend]
        "trend",
        "trend.frac",
        "trend.iterations",
        // [report]
        "report",
        "report.format",
        "report.by_component",
        "report.export_dir",
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Levenshtein edit distance over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve alphabetically so suggestions are stable across runs.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Does NOT fail on unknown keys; parse errors are left to serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Value Range Validation
// ============================================================================

/// Validate value ranges on a parsed `HealthConfig`.
///
/// Returns (errors, warnings): errors are values the pipeline cannot run
/// with; warnings are legal but probably unintended.
pub fn validate_value_ranges(config: &super::HealthConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let t = &config.trend;

    // NaN/Inf comparisons silently pass, catch them explicitly
    if !t.frac.is_finite() || t.frac <= 0.0 || t.frac > 1.0 {
        errors.push(format!("trend.frac = {} must be in (0, 1]", t.frac));
    } else if t.frac > defaults::TREND_FRAC_HEAVY {
        warnings.push(ValidationWarning {
            field: "trend.frac".to_string(),
            message: format!(
                "trend.frac = {:.2} smooths over more than half the series",
                t.frac
            ),
            suggestion: None,
        });
    }

    if t.iterations > defaults::MAX_TREND_ITERATIONS {
        errors.push(format!(
            "trend.iterations = {} exceeds maximum ({})",
            t.iterations,
            defaults::MAX_TREND_ITERATIONS
        ));
    } else if t.iterations == 0 {
        warnings.push(ValidationWarning {
            field: "trend.iterations".to_string(),
            message: "trend.iterations = 0 disables outlier down-weighting".to_string(),
            suggestion: None,
        });
    }

    if config.input.round_decimals > defaults::MAX_ROUND_DECIMALS {
        errors.push(format!(
            "input.round_decimals = {} exceeds maximum ({})",
            config.input.round_decimals,
            defaults::MAX_ROUND_DECIMALS
        ));
    }

    if let Some(dir) = &config.report.export_dir {
        if dir.as_os_str().is_empty() {
            errors.push("report.export_dir must not be empty when set".to_string());
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthConfig;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("frac", "frac"), 0);
        assert_eq!(levenshtein("frac", "farc"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("°c", "c"), 1);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let value: toml::Value = "[trend]\nfrac = 0.1\n[report]\nformat = \"json\"\n"
            .parse()
            .unwrap();
        let keys = walk_toml_keys(&value, "");
        assert!(keys.contains(&"trend".to_string()));
        assert!(keys.contains(&"trend.frac".to_string()));
        assert!(keys.contains(&"report.format".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys("[trend]\niteratons = 3\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "trend.iteratons");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("trend.iterations"));
        assert!(warnings[0].to_string().contains("did you mean 'trend.iterations'"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[input]
drop_incomplete = false
round_decimals = 2

[trend]
frac = 0.05

[report]
by_component = true
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[thresholds]\ntemperature = 90\n");
        assert!(warnings.iter().any(|w| w.field == "thresholds"));
        assert!(warnings.iter().any(|w| w.field == "thresholds.temperature"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_value_ranges(&HealthConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_range_errors() {
        let mut config = HealthConfig::default();
        config.trend.frac = f64::NAN;
        config.trend.iterations = 11;
        config.input.round_decimals = 12;
        config.report.export_dir = Some(std::path::PathBuf::new());
        let (errors, _) = validate_value_ranges(&config);
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn test_range_warnings() {
        let mut config = HealthConfig::default();
        config.trend.frac = 0.8;
        config.trend.iterations = 0;
        let (errors, warnings) = validate_value_ranges(&config);
        assert!(errors.is_empty());
        let fields: Vec<_> = warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["trend.frac", "trend.iterations"]);
    }
}
