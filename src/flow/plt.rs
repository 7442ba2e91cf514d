//! PLT Stacked Curves
//!
//! Assembles the stacked flow curves of a PLT plot from curve definitions:
//!
//! - simulation RFT and grid sources: pipe branch along the well path, then
//!   the accumulator in total mode (reservoir condition, grid sources only)
//!   and/or phase mode (standard condition)
//! - observed LAS flow logs: flow channels passed through, largest first
//!
//! Missing geometry and mixed unit systems are reported as warnings next to
//! the curves. Nothing here fails.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

use super::accumulator::{AccumulatedWellFlow, TracerMode};
use super::branch::build_pipe_branch;
use super::cell_results::{RftCellResults, SimWellCellResults};
use crate::config::FlowConfig;
use crate::provider::{FlowDataProvider, LasFlowLog, WellPathGeometryProvider};
use crate::source::{CaseHandle, DataSourceKey, LasFileHandle};
use crate::timeline::{create_time_format_string, format_time_step, RftPltCurveDefinition};
use crate::types::channels::{flow_phase_from_channel_name, is_total_flow_channel};
use crate::types::{
    curve_unit_text, flow_plot_axis_title, flow_unit_text, FlowCondition, FlowPhase, Timestamp,
    UnitSystem,
};

// ============================================================================
// Options / Output Types
// ============================================================================

/// User choices that shape the PLT curves.
#[derive(Debug, Clone, PartialEq)]
pub struct PltCurveOptions {
    pub phases: BTreeSet<FlowPhase>,
    pub use_standard_condition: bool,
    pub use_reservoir_condition: bool,
    /// Gas conversion and short-branch folding for simulated sources
    pub flow: FlowConfig,
}

impl Default for PltCurveOptions {
    fn default() -> Self {
        Self {
            phases: [FlowPhase::Oil, FlowPhase::Gas, FlowPhase::Water].into_iter().collect(),
            use_standard_condition: true,
            use_reservoir_condition: true,
            flow: FlowConfig::default(),
        }
    }
}

/// One stacked curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedCurve {
    pub name: String,
    pub phase: FlowPhase,
    pub depths: Vec<f64>,
    pub values: Vec<f64>,
    /// Curves with the same group id stack on each other
    pub group_id: usize,
    /// Curves of the first group are drawn filled
    pub fill: bool,
}

/// Non-fatal conditions found while building curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PltWarning {
    MissingWellPathGeometry { well_name: String, source: String },
    InconsistentUnits(BTreeSet<UnitSystem>),
}

impl fmt::Display for PltWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PltWarning::MissingWellPathGeometry { well_name, source } => {
                write!(f, "No well path geometry for '{well_name}' in {source}, curves omitted")
            }
            PltWarning::InconsistentUnits(systems) => {
                let names: Vec<String> = systems.iter().map(ToString::to_string).collect();
                write!(f, "Inconsistent units in PLT plot ({})", names.join(", "))
            }
        }
    }
}

/// Curves plus warnings and the x-axis title.
#[derive(Debug, Clone, Default)]
pub struct PltCurveSet {
    pub curves: Vec<StackedCurve>,
    pub warnings: Vec<PltWarning>,
    pub axis_title: String,
}

// ============================================================================
// Unit Consistency
// ============================================================================

/// Unit systems present in a source selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitConsistency {
    Unknown,
    Consistent(UnitSystem),
    Inconsistent(BTreeSet<UnitSystem>),
}

impl UnitConsistency {
    /// Unit system to label axes with: the single one, or the first of many.
    pub fn display_unit_system(&self) -> Option<UnitSystem> {
        match self {
            UnitConsistency::Unknown => None,
            UnitConsistency::Consistent(system) => Some(*system),
            UnitConsistency::Inconsistent(systems) => systems.first().copied(),
        }
    }
}

pub fn unit_consistency<'a, I>(sources: I) -> UnitConsistency
where
    I: IntoIterator<Item = &'a DataSourceKey>,
{
    let systems: BTreeSet<UnitSystem> = sources
        .into_iter()
        .flat_map(DataSourceKey::available_unit_systems)
        .collect();

    match systems.len() {
        0 => UnitConsistency::Unknown,
        1 => systems
            .first()
            .copied()
            .map_or(UnitConsistency::Unknown, UnitConsistency::Consistent),
        _ => {
            warn!(systems = ?systems, "Inconsistent units in PLT plot");
            UnitConsistency::Inconsistent(systems)
        }
    }
}

/// X-axis title for the enabled flow conditions.
pub fn plt_axis_title(options: &PltCurveOptions, unit_system: UnitSystem) -> String {
    let mut parts = Vec::new();
    if options.use_reservoir_condition {
        parts.push(flow_plot_axis_title(FlowCondition::Reservoir, unit_system));
    }
    if options.use_standard_condition {
        parts.push(flow_plot_axis_title(FlowCondition::Standard, unit_system));
    }
    parts.join(" | ")
}

// ============================================================================
// Curve Assembly
// ============================================================================

/// Build the stacked curves for a set of curve definitions.
///
/// `well_path_name` selects the geometry; each definition's own well name is
/// used for the case data.
pub fn stacked_curves<P>(
    provider: &P,
    well_path_name: &str,
    curve_defs: &BTreeSet<RftPltCurveDefinition>,
    options: &PltCurveOptions,
) -> PltCurveSet
where
    P: FlowDataProvider + WellPathGeometryProvider + ?Sized,
{
    let mut result = PltCurveSet::default();

    let consistency = unit_consistency(curve_defs.iter().map(|d| &d.source));
    if let UnitConsistency::Inconsistent(systems) = &consistency {
        result.warnings.push(PltWarning::InconsistentUnits(systems.clone()));
    }
    if let Some(system) = consistency.display_unit_system() {
        result.axis_title = plt_axis_title(options, system);
    }

    let time_steps: Vec<Timestamp> = curve_defs.iter().map(|d| d.time_step).collect();
    let date_format = create_time_format_string(&time_steps);

    let mut group_id = 0;
    for def in curve_defs {
        let curve_name = format!(
            "{}, {}",
            def.source.display_name(),
            format_time_step(&def.time_step, &date_format)
        );

        match &def.source {
            DataSourceKey::SimWellRft { case } | DataSourceKey::GridCellData { case } => {
                simulated_curves(
                    provider,
                    well_path_name,
                    def,
                    case,
                    &curve_name,
                    options,
                    &mut group_id,
                    &mut result,
                );
            }
            DataSourceKey::ObservedLasFile { file } => {
                if let Some(log) = provider.las_flow_log(file) {
                    observed_curves(
                        &log,
                        file,
                        &curve_name,
                        options,
                        &mut group_id,
                        &mut result.curves,
                    );
                }
            }
            _ => {}
        }
        group_id += 1;
    }

    debug!(
        well = well_path_name,
        curves = result.curves.len(),
        warnings = result.warnings.len(),
        "Built PLT curves"
    );

    result
}

#[allow(clippy::too_many_arguments)]
fn simulated_curves<P>(
    provider: &P,
    well_path_name: &str,
    def: &RftPltCurveDefinition,
    case: &CaseHandle,
    curve_name: &str,
    options: &PltCurveOptions,
    group_id: &mut usize,
    result: &mut PltCurveSet,
) where
    P: FlowDataProvider + WellPathGeometryProvider + ?Sized,
{
    let intersections = provider.cell_intersections(well_path_name, case);
    if intersections.is_empty() {
        warn!(well = well_path_name, case = %case.name, "No well path geometry, skipping curves");
        result.warnings.push(PltWarning::MissingWellPathGeometry {
            well_name: well_path_name.to_string(),
            source: def.source.display_name(),
        });
        return;
    }

    let is_grid = matches!(def.source, DataSourceKey::GridCellData { .. });
    let branch = if is_grid {
        match SimWellCellResults::from_provider(provider, case, &def.well_name, def.time_step) {
            Some(cells) => build_pipe_branch(&intersections, &cells, def.time_step),
            None => return,
        }
    } else {
        let cells = RftCellResults::from_provider(
            provider,
            case,
            &def.well_name,
            def.time_step,
            &options.flow,
        );
        build_pipe_branch(&intersections, &cells, def.time_step)
    };

    if branch.coords.is_empty() {
        debug!(
            well = well_path_name,
            source = %def.source,
            "No matching cell results along well path"
        );
        return;
    }

    let unit_system = case.unit_system;

    if options.phases.contains(&FlowPhase::Total) && options.use_reservoir_condition && is_grid {
        let accumulator =
            AccumulatedWellFlow::from_branch(branch.clone(), TracerMode::Total, &options.flow);
        let unit_text = flow_unit_text(FlowCondition::Reservoir, unit_system);
        for curve in accumulator.pseudo_length_curves(0) {
            result.curves.push(StackedCurve {
                name: format!("{curve_name}, {} {unit_text}", curve.tracer),
                phase: FlowPhase::Total,
                depths: curve.depths,
                values: curve.accumulated_flow,
                group_id: *group_id,
                fill: *group_id == 0,
            });
        }
        *group_id += 1;
    }

    if options.use_standard_condition {
        let accumulator =
            AccumulatedWellFlow::from_branch(branch, TracerMode::Phases, &options.flow);
        for curve in accumulator.pseudo_length_curves(0) {
            let phase = FlowPhase::from_tracer_name(&curve.tracer);
            let is_phase = matches!(phase, FlowPhase::Oil | FlowPhase::Gas | FlowPhase::Water);
            if !is_phase || !options.phases.contains(&phase) {
                continue;
            }
            let unit_text = curve_unit_text(FlowCondition::Standard, unit_system, phase);
            result.curves.push(StackedCurve {
                name: format!("{curve_name}, {} {unit_text}", curve.tracer),
                phase,
                depths: curve.depths,
                values: curve.accumulated_flow,
                group_id: *group_id,
                fill: *group_id == 0,
            });
        }
    }
}

fn observed_curves(
    log: &LasFlowLog,
    file: &LasFileHandle,
    curve_name: &str,
    options: &PltCurveOptions,
    group_id: &mut usize,
    curves: &mut Vec<StackedCurve>,
) {
    let condition_selected = match log.flow_condition {
        FlowCondition::Standard => options.use_standard_condition,
        FlowCondition::Reservoir => options.use_reservoir_condition,
    };
    if !condition_selected {
        return;
    }

    let depth_unit = if log.depth_unit.is_empty() {
        &file.depth_unit
    } else {
        &log.depth_unit
    };
    let unit_system = UnitSystem::from_depth_unit(depth_unit);

    // Largest first value first; ties by name, then file order
    let mut channels: Vec<(usize, &str, f64)> = log
        .channels
        .iter()
        .enumerate()
        .filter_map(|(idx, ch)| {
            ch.values
                .first()
                .map(|first| (idx, ch.name.as_str(), -first.abs()))
        })
        .collect();
    channels.sort_by(|a, b| {
        a.2.total_cmp(&b.2)
            .then_with(|| a.1.cmp(b.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    for (idx, name, _) in channels {
        let phase = flow_phase_from_channel_name(name);
        if !options.phases.contains(&phase) {
            continue;
        }
        let unit_text = curve_unit_text(log.flow_condition, unit_system, phase);
        curves.push(StackedCurve {
            name: format!("{curve_name}, {name} {unit_text}"),
            phase,
            depths: log.depths.clone(),
            values: log.channels[idx].values.clone(),
            group_id: *group_id,
            fill: *group_id == 0,
        });
        // Total flow sorts first; the phases after it stack as their own group
        if is_total_flow_channel(name) {
            *group_id += 1;
        }
    }
}
