//! Provider interfaces
//!
//! The engine never reads files or case data itself. Everything it needs is
//! asked of these read-only traits, passed explicitly into each call:
//!
//! - `TimeStepProvider`: which time steps each kind of source has for a well
//! - `FlowDataProvider`: raw per-cell flow data (RFT rates, simulation-well
//!   result frames, observed LAS flow logs)
//! - `WellPathGeometryProvider`: trajectory / grid cell intersections
//! - `CellResultProvider`: flow lookup by global cell index, built by the
//!   flow module from `FlowDataProvider` data
//!
//! `ProjectSnapshot` implements the first three over an in-memory JSON model.

mod snapshot;

pub use snapshot::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::flow::{CellId, CellIntersection, WellResultPoint};
use crate::source::{CaseHandle, LasFileHandle, ObservedDataHandle, SummaryCaseHandle};
use crate::types::{ChannelFilter, FlowCondition, Timestamp};

// ============================================================================
// Time Steps
// ============================================================================

/// Time-step queries per source kind.
pub trait TimeStepProvider {
    /// Simulation-well name associated with a well path name.
    ///
    /// Defaults to the name itself, for callers that already pass
    /// simulation-well names.
    fn simulation_well_name(&self, well_name: &str) -> String {
        well_name.to_string()
    }

    /// Recorded date of an observed LAS file.
    fn las_file_date(&self, file: &LasFileHandle) -> Option<Timestamp>;

    /// Dates at which the case's RFT file has data for the well, restricted
    /// to the given channels (empty filter = any channel).
    fn rft_time_steps(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        channels: &ChannelFilter,
    ) -> BTreeSet<Timestamp>;

    /// All report dates of a grid case, indexed by report step.
    fn report_time_steps(&self, case: &CaseHandle) -> Vec<Timestamp>;

    /// Whether the case has simulation-well data for the well at all.
    fn has_sim_well(&self, case: &CaseHandle, sim_well_name: &str) -> bool;

    /// Whether the simulation well has results at the given report step.
    fn has_well_result(&self, case: &CaseHandle, sim_well_name: &str, report_step: usize) -> bool;

    /// RFT dates available in a summary case for the well.
    fn summary_rft_time_steps(
        &self,
        summary_case: &SummaryCaseHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp>;

    fn fmu_rft_time_steps(&self, data: &ObservedDataHandle, well_name: &str) -> BTreeSet<Timestamp>;

    fn pressure_depth_time_steps(
        &self,
        data: &ObservedDataHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp>;
}

// ============================================================================
// Flow Data
// ============================================================================

/// Surface phase rates of one RFT connection cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RftCellRates {
    pub global_cell_index: usize,
    #[serde(default)]
    pub oil: f64,
    #[serde(default)]
    pub gas: f64,
    #[serde(default)]
    pub water: f64,
}

/// One channel of an observed LAS flow log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LasChannel {
    pub name: String,
    pub values: Vec<f64>,
}

/// Observed PLT flow log (depth track plus flow channels).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LasFlowLog {
    pub depths: Vec<f64>,
    #[serde(default)]
    pub depth_unit: String,
    #[serde(default)]
    pub flow_condition: FlowCondition,
    #[serde(default)]
    pub channels: Vec<LasChannel>,
}

/// Raw per-cell flow data behind RFT, grid and observed sources.
pub trait FlowDataProvider {
    /// RFT connection rates for the well at one date. Empty when absent.
    fn rft_cell_rates(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
    ) -> Vec<RftCellRates>;

    /// Simulation-well result points per branch at one date.
    fn sim_well_result_frame(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
    ) -> Option<Vec<Vec<WellResultPoint>>>;

    /// Global (reservoir) cell index of a grid cell. Main-grid cells map to
    /// themselves unless overridden.
    fn reservoir_cell_index(&self, _case: &CaseHandle, cell: CellId) -> usize {
        cell.cell_index
    }

    fn las_flow_log(&self, file: &LasFileHandle) -> Option<LasFlowLog>;
}

// ============================================================================
// Geometry / Cell Lookup
// ============================================================================

/// Well-path geometry against a grid case.
pub trait WellPathGeometryProvider {
    /// Ordered cell intersections along the well path. Empty when the well
    /// has no geometry.
    fn cell_intersections(&self, well_name: &str, case: &CaseHandle) -> Vec<CellIntersection>;
}

/// Flow lookup by global cell index.
pub trait CellResultProvider {
    fn flow_at_cell(
        &self,
        global_cell_index: usize,
        time_step: Timestamp,
    ) -> Option<WellResultPoint>;
}
