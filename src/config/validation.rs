//! Config validation: unknown-key detection with Levenshtein suggestions
//! and value range checks.
//!
//! The raw TOML is first walked as a `toml::Value` tree and every dotted key
//! compared against the fields of `EngineConfig`; serde deserialization
//! runs afterwards and silently ignores the unknown keys reported here.

use std::collections::HashSet;

use super::defaults::{GAS_FACTOR_TYPICAL_MAX, GAS_FACTOR_TYPICAL_MIN};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
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

/// Returns the complete set of valid dotted key paths for EngineConfig.
///
/// Maintained by hand to match the struct hierarchy in engine_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [timeline]
        "timeline",
        "timeline.date_format",
        "timeline.time_format",
        "timeline.tag_separator",
        // [flow]
        "flow",
        "flow.field_gas_to_oil_equivalent",
        "flow.metric_gas_to_oil_equivalent",
        "flow.short_branch_point_limit",
        // [channels]
        "channels",
        "channels.pressure",
        "channels.oil",
        "channels.gas",
        "channels.water",
        "channels.total",
    ];
    keys.iter().copied().collect()
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
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3. Ties resolve to the
/// lexicographically smallest key.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Unknown keys only warn; the file still loads.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Value Range Validation
// ============================================================================

/// Validate value ranges on a parsed EngineConfig.
///
/// Returns (errors, warnings). Errors are values that cannot work, warnings
/// are suspicious but usable.
pub fn validate_value_ranges(
    config: &super::EngineConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let typical = GAS_FACTOR_TYPICAL_MIN..=GAS_FACTOR_TYPICAL_MAX;
    for (field, value) in [
        ("flow.field_gas_to_oil_equivalent", config.flow.field_gas_to_oil_equivalent),
        ("flow.metric_gas_to_oil_equivalent", config.flow.metric_gas_to_oil_equivalent),
    ] {
        if value.is_finite() && value > 0.0 && !typical.contains(&value) {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!(
                    "{field} = {value:e} is outside typical range ({GAS_FACTOR_TYPICAL_MIN:e}-{GAS_FACTOR_TYPICAL_MAX})"
                ),
                suggestion: None,
            });
        }
    }

    let channels = &config.channels;
    for (field, names) in [
        ("channels.pressure", &channels.pressure),
        ("channels.oil", &channels.oil),
        ("channels.gas", &channels.gas),
        ("channels.water", &channels.water),
        ("channels.total", &channels.total),
    ] {
        for name in names.iter().filter(|n| n.starts_with('^')) {
            let anchored = format!("^(?:{})$", name.trim_start_matches('^'));
            if let Err(e) = regex::Regex::new(&anchored) {
                errors.push(format!("{field}: pattern '{name}' does not compile: {e}"));
            }
        }
        if names.iter().any(|n| n.trim().is_empty()) {
            errors.push(format!("{field} contains an empty channel name"));
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
