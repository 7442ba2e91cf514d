//! Unit systems, flow phases and the unit texts used on PLT axes and curves.

use serde::{Deserialize, Serialize};

use crate::config::FlowConfig;

// ============================================================================
// Unit System
// ============================================================================

/// Unit system of a simulation case or observed log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Metric,
    Field,
    Lab,
    #[default]
    Unknown,
}

impl UnitSystem {
    /// Unit system implied by the depth unit of a well log.
    ///
    /// Metres map to metric, feet to field. Anything else is unknown.
    pub fn from_depth_unit(depth_unit: &str) -> Self {
        match depth_unit.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => UnitSystem::Metric,
            "ft" | "f" | "feet" | "foot" => UnitSystem::Field,
            _ => UnitSystem::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != UnitSystem::Unknown
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "Metric"),
            UnitSystem::Field => write!(f, "Field"),
            UnitSystem::Lab => write!(f, "Lab"),
            UnitSystem::Unknown => write!(f, "Unknown"),
        }
    }
}

// ============================================================================
// Flow Condition / Phase
// ============================================================================

/// Whether flow rates are expressed at reservoir or standard (surface) conditions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowCondition {
    Reservoir,
    #[default]
    Standard,
}

/// Flow phase selectable on a PLT plot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    Oil,
    Gas,
    Water,
    Total,
    None,
}

impl FlowPhase {
    /// Tracer name used by the accumulator for this phase.
    pub fn tracer_name(self) -> &'static str {
        match self {
            FlowPhase::Oil => tracer::OIL,
            FlowPhase::Gas => tracer::GAS,
            FlowPhase::Water => tracer::WATER,
            FlowPhase::Total => tracer::TOTAL,
            FlowPhase::None => "",
        }
    }

    pub fn from_tracer_name(name: &str) -> Self {
        match name {
            tracer::OIL => FlowPhase::Oil,
            tracer::GAS => FlowPhase::Gas,
            tracer::WATER => FlowPhase::Water,
            tracer::TOTAL => FlowPhase::Total,
            _ => FlowPhase::None,
        }
    }
}

/// Tracer names produced by the accumulated well-flow calculator.
pub mod tracer {
    pub const OIL: &str = "Oil";
    pub const GAS: &str = "Gas";
    pub const WATER: &str = "Water";
    pub const TOTAL: &str = "Total";
}

// ============================================================================
// Gas → Oil Equivalent Conversion
// ============================================================================

/// Convert a surface gas flow rate to oil-equivalent units for stacking.
///
/// Field: Mscf/day → BOE/day. Metric: Sm3/day → kSm3/day, each with the
/// factor from `flow`. Lab and unknown unit systems are returned unchanged.
pub fn convert_surface_gas_rate_to_oil_equivalent(
    unit_system: UnitSystem,
    gas_rate: f64,
    flow: &FlowConfig,
) -> f64 {
    match unit_system {
        UnitSystem::Field => gas_rate * flow.field_gas_to_oil_equivalent,
        UnitSystem::Metric => gas_rate * flow.metric_gas_to_oil_equivalent,
        UnitSystem::Lab | UnitSystem::Unknown => gas_rate,
    }
}

// ============================================================================
// Unit Texts
// ============================================================================

fn reservoir_rate_unit_text(unit_system: UnitSystem) -> &'static str {
    match unit_system {
        UnitSystem::Metric => "[m3/day]",
        UnitSystem::Field => "[Brl/day]",
        UnitSystem::Lab => "[cm3/hr]",
        UnitSystem::Unknown => "",
    }
}

fn reservoir_volume_unit_text(unit_system: UnitSystem) -> &'static str {
    match unit_system {
        UnitSystem::Metric => "[m3]",
        UnitSystem::Field => "[Brl]",
        UnitSystem::Lab => "[cm3]",
        UnitSystem::Unknown => "",
    }
}

/// Unit text for a flow-rate axis.
pub fn flow_unit_text(condition: FlowCondition, unit_system: UnitSystem) -> &'static str {
    match condition {
        FlowCondition::Reservoir => reservoir_rate_unit_text(unit_system),
        FlowCondition::Standard => match unit_system {
            UnitSystem::Metric => "[Liquid Sm3/day], [Gas kSm3/day]",
            UnitSystem::Field => "[Liquid BBL/day], [Gas BOE/day]",
            UnitSystem::Lab => "[cm3/hr]",
            UnitSystem::Unknown => "",
        },
    }
}

/// Axis title for a flow-rate track, e.g. `"Surface Flow Rate [Liquid BBL/day], [Gas BOE/day]"`.
pub fn flow_plot_axis_title(condition: FlowCondition, unit_system: UnitSystem) -> String {
    let prefix = match condition {
        FlowCondition::Reservoir => "Reservoir Flow Rate",
        FlowCondition::Standard => "Surface Flow Rate",
    };
    format!("{} {}", prefix, flow_unit_text(condition, unit_system))
}

/// Unit text for a cumulative flow-volume axis.
pub fn flow_volume_unit_text(condition: FlowCondition, unit_system: UnitSystem) -> &'static str {
    match condition {
        FlowCondition::Reservoir => reservoir_volume_unit_text(unit_system),
        FlowCondition::Standard => match unit_system {
            UnitSystem::Metric => "[Liquid Sm3], [Gas kSm3]",
            UnitSystem::Field => "[Liquid BBL], [Gas BOE]",
            UnitSystem::Lab => "[cm3]",
            UnitSystem::Unknown => "",
        },
    }
}

pub fn flow_volume_plot_axis_title(condition: FlowCondition, unit_system: UnitSystem) -> String {
    let prefix = match condition {
        FlowCondition::Reservoir => "Reservoir Flow Volume",
        FlowCondition::Standard => "Surface Flow Volume",
    };
    format!("{} {}", prefix, flow_volume_unit_text(condition, unit_system))
}

/// Unit text for a single stacked curve of the given phase.
pub fn curve_unit_text(
    condition: FlowCondition,
    unit_system: UnitSystem,
    phase: FlowPhase,
) -> &'static str {
    if condition == FlowCondition::Reservoir {
        return reservoir_rate_unit_text(unit_system);
    }
    match (unit_system, phase) {
        (UnitSystem::Metric, FlowPhase::Gas) => "[kSm3/day]",
        (UnitSystem::Metric, FlowPhase::Oil | FlowPhase::Water) => "[Sm3/day]",
        (UnitSystem::Field, FlowPhase::Gas) => "[BOE/day]",
        (UnitSystem::Field, FlowPhase::Oil | FlowPhase::Water) => "[BBL/day]",
        (UnitSystem::Lab, _) => "[cm3/hr]",
        (UnitSystem::Unknown, _) => "",
        (system, _) => flow_unit_text(FlowCondition::Standard, system),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_unit_mapping() {
        assert_eq!(UnitSystem::from_depth_unit("M"), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_depth_unit("ft"), UnitSystem::Field);
        assert_eq!(UnitSystem::from_depth_unit("furlong"), UnitSystem::Unknown);
    }

    #[test]
    fn test_gas_conversion_per_unit_system() {
        let flow = FlowConfig::default();
        let convert = |units, rate| convert_surface_gas_rate_to_oil_equivalent(units, rate, &flow);
        assert!((convert(UnitSystem::Field, 5800.0) - 1000.0).abs() < 1e-9);
        assert!((convert(UnitSystem::Metric, 2000.0) - 2.0).abs() < 1e-12);
        assert_eq!(convert(UnitSystem::Lab, 7.5), 7.5);
        assert_eq!(convert(UnitSystem::Unknown, 7.5), 7.5);
    }

    #[test]
    fn test_gas_conversion_uses_given_factors() {
        let flow = FlowConfig {
            field_gas_to_oil_equivalent: 0.5,
            metric_gas_to_oil_equivalent: 0.25,
            ..FlowConfig::default()
        };
        let convert = |units, rate| convert_surface_gas_rate_to_oil_equivalent(units, rate, &flow);
        assert_eq!(convert(UnitSystem::Field, 10.0), 5.0);
        assert_eq!(convert(UnitSystem::Metric, 10.0), 2.5);
    }

    #[test]
    fn test_curve_unit_text_by_phase() {
        assert_eq!(
            curve_unit_text(FlowCondition::Standard, UnitSystem::Field, FlowPhase::Gas),
            "[BOE/day]"
        );
        assert_eq!(
            curve_unit_text(FlowCondition::Standard, UnitSystem::Metric, FlowPhase::Water),
            "[Sm3/day]"
        );
        assert_eq!(
            curve_unit_text(FlowCondition::Standard, UnitSystem::Metric, FlowPhase::Total),
            "[Liquid Sm3/day], [Gas kSm3/day]"
        );
        assert_eq!(
            curve_unit_text(FlowCondition::Reservoir, UnitSystem::Field, FlowPhase::Oil),
            "[Brl/day]"
        );
    }

    #[test]
    fn test_axis_titles() {
        assert_eq!(
            flow_plot_axis_title(FlowCondition::Reservoir, UnitSystem::Metric),
            "Reservoir Flow Rate [m3/day]"
        );
        assert_eq!(
            flow_volume_plot_axis_title(FlowCondition::Standard, UnitSystem::Field),
            "Surface Flow Volume [Liquid BBL], [Gas BOE]"
        );
    }

    #[test]
    fn test_tracer_name_roundtrip() {
        for phase in [FlowPhase::Oil, FlowPhase::Gas, FlowPhase::Water, FlowPhase::Total] {
            assert_eq!(FlowPhase::from_tracer_name(phase.tracer_name()), phase);
        }
    }
}
