//! Built-in default constants.
//!
//! These are the values used when no `rft_plt.toml` is loaded, and the
//! fallbacks for every `cfg_*` accessor.

// ============================================================================
// Timeline Labels
// ============================================================================

/// chrono strftime pattern for the date part of a time-step label.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%b %Y";

/// chrono strftime pattern for the time-of-day part, used only when two
/// time steps fall on the same day.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Separator between source tags in a time-step label.
pub const DEFAULT_TAG_SEPARATOR: &str = ", ";

// ============================================================================
// Flow
// ============================================================================

/// Field units: Mscf/day gas to barrels of oil equivalent per day.
pub const FIELD_GAS_TO_OIL_EQUIVALENT: f64 = 1000.0 / 5800.0;

/// Metric units: Sm3/day gas to kSm3/day.
pub const METRIC_GAS_TO_OIL_EQUIVALENT: f64 = 1.0 / 1000.0;

/// Downstream branches with at most this many result points are folded
/// into the connecting cell's own flow.
pub const SHORT_BRANCH_POINT_LIMIT: usize = 3;

/// Plausible range for a gas conversion factor. Values outside warn.
pub const GAS_FACTOR_TYPICAL_MIN: f64 = 1e-5;
pub const GAS_FACTOR_TYPICAL_MAX: f64 = 10.0;

// ============================================================================
// Well-Log Channel Names
// ============================================================================

pub const PRESSURE_CHANNEL_NAMES: &[&str] = &["PRESSURE", "PRES_FORM"];
pub const OIL_CHANNEL_NAMES: &[&str] = &["QOZT", "QOIL", r"^.*\D_QOIL"];
pub const GAS_CHANNEL_NAMES: &[&str] = &["QGZT", "QGAS", r"^.*\D_QGAS"];
pub const WATER_CHANNEL_NAMES: &[&str] = &["QWZT", "QWAT", r"^.*\D_QWAT"];
pub const TOTAL_CHANNEL_NAMES: &[&str] = &["QTZT", "QTOT", r"^.*\D_QTOT"];
