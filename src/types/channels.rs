//! RFT channel types and well-log channel name classification.
//!
//! Channel names listed in config are matched two ways: a name starting
//! with `^` is a regex that must match the whole channel name, any other
//! name matches when it contains the channel name case-insensitively.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use super::units::FlowPhase;
use crate::config::ChannelNamesConfig;

// ============================================================================
// RFT Channel Types
// ============================================================================

/// Result channel available in an RFT file for one well and date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RftChannelType {
    Tvd,
    Md,
    Pressure,
    Swat,
    Soil,
    Sgas,
    Wrat,
    Orat,
    Grat,
    PressureP10,
    PressureP50,
    PressureP90,
    PressureMean,
    PressureError,
}

/// Set of channel types a caller is interested in. Empty means "any channel".
pub type ChannelFilter = BTreeSet<RftChannelType>;

impl RftChannelType {
    /// Channels displayed on an RFT (pressure) plot.
    pub fn rft_plot_channel_types() -> ChannelFilter {
        [
            RftChannelType::Pressure,
            RftChannelType::PressureError,
            RftChannelType::PressureMean,
            RftChannelType::PressureP10,
            RftChannelType::PressureP50,
            RftChannelType::PressureP90,
        ]
        .into_iter()
        .collect()
    }

    /// Channels displayed on a PLT (flow) plot.
    pub fn plt_plot_channel_types() -> ChannelFilter {
        [RftChannelType::Orat, RftChannelType::Wrat, RftChannelType::Grat]
            .into_iter()
            .collect()
    }
}

// ============================================================================
// Channel Name Matching
// ============================================================================

fn cfg_channel_names() -> ChannelNamesConfig {
    if crate::config::is_initialized() {
        crate::config::get().channels.clone()
    } else {
        ChannelNamesConfig::default()
    }
}

/// Match a channel name against a list of known names or `^`-prefixed patterns.
pub fn try_match_channel_name(known_names: &[String], channel_name: &str) -> bool {
    known_names.iter().any(|known| {
        if known.starts_with('^') {
            let anchored = format!("^(?:{})$", known.trim_start_matches('^'));
            match Regex::new(&anchored) {
                Ok(re) => re.is_match(channel_name),
                Err(e) => {
                    warn!(pattern = %known, error = %e, "Invalid channel-name pattern ignored");
                    false
                }
            }
        } else {
            known.to_uppercase().contains(&channel_name.to_uppercase())
        }
    })
}

pub fn is_pressure_channel(channel_name: &str) -> bool {
    cfg_channel_names()
        .pressure
        .iter()
        .any(|name| name.eq_ignore_ascii_case(channel_name))
}

pub fn is_oil_flow_channel(channel_name: &str) -> bool {
    try_match_channel_name(&cfg_channel_names().oil, channel_name)
}

pub fn is_gas_flow_channel(channel_name: &str) -> bool {
    try_match_channel_name(&cfg_channel_names().gas, channel_name)
}

pub fn is_water_flow_channel(channel_name: &str) -> bool {
    try_match_channel_name(&cfg_channel_names().water, channel_name)
}

pub fn is_total_flow_channel(channel_name: &str) -> bool {
    try_match_channel_name(&cfg_channel_names().total, channel_name)
}

/// True when the channel carries any kind of flow data.
pub fn is_flow_channel(channel_name: &str) -> bool {
    flow_phase_from_channel_name(channel_name) != FlowPhase::None
}

/// Classify a well-log channel by flow phase. Oil is tested first, then gas,
/// water and total.
pub fn flow_phase_from_channel_name(channel_name: &str) -> FlowPhase {
    let names = cfg_channel_names();
    if try_match_channel_name(&names.oil, channel_name) {
        FlowPhase::Oil
    } else if try_match_channel_name(&names.gas, channel_name) {
        FlowPhase::Gas
    } else if try_match_channel_name(&names.water, channel_name) {
        FlowPhase::Water
    } else if try_match_channel_name(&names.total, channel_name) {
        FlowPhase::Total
    } else {
        FlowPhase::None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_match_case_insensitively() {
        assert_eq!(flow_phase_from_channel_name("qoil"), FlowPhase::Oil);
        assert_eq!(flow_phase_from_channel_name("QGZT"), FlowPhase::Gas);
        assert_eq!(flow_phase_from_channel_name("QWAT"), FlowPhase::Water);
        assert_eq!(flow_phase_from_channel_name("QTOT"), FlowPhase::Total);
    }

    #[test]
    fn test_regex_names_require_full_match() {
        assert_eq!(flow_phase_from_channel_name("WELLA_QOIL"), FlowPhase::Oil);
        assert_eq!(flow_phase_from_channel_name("WELLA_QWAT"), FlowPhase::Water);
        assert_eq!(flow_phase_from_channel_name("WELLA_QOIL_X"), FlowPhase::None);
    }

    #[test]
    fn test_unrelated_channel_is_not_flow() {
        assert!(!is_flow_channel("GR"));
        assert!(!is_flow_channel("DEPTH"));
    }

    #[test]
    fn test_pressure_channel_exact_name() {
        assert!(is_pressure_channel("pressure"));
        assert!(is_pressure_channel("PRES_FORM"));
        assert!(!is_pressure_channel("PRES"));
    }

    #[test]
    fn test_plt_channel_types() {
        let plt = RftChannelType::plt_plot_channel_types();
        assert_eq!(plt.len(), 3);
        assert!(!plt.contains(&RftChannelType::Pressure));
        assert!(RftChannelType::rft_plot_channel_types().contains(&RftChannelType::Pressure));
    }
}
