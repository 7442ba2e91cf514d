//! In-memory project snapshot
//!
//! A serde model of everything the providers expose, loaded from JSON. The
//! CLI reads one from disk; tests build them in code.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::{FlowDataProvider, LasFlowLog, RftCellRates, TimeStepProvider, WellPathGeometryProvider};
use crate::flow::{CellIntersection, WellResultPoint};
use crate::source::{
    CaseHandle, DataSourceKey, LasFileHandle, ObservedDataHandle, SummaryCaseHandle,
};
use crate::types::{ChannelFilter, RftChannelType, Timestamp};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Records
// ============================================================================

/// Cell intersections of one well path against one grid case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionRecord {
    pub case_id: i32,
    pub segments: Vec<CellIntersection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellPathRecord {
    pub name: String,
    /// Associated simulation well, when it differs from the well path name
    #[serde(default)]
    pub sim_well_name: Option<String>,
    #[serde(default)]
    pub intersections: Vec<IntersectionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimWellFrameRecord {
    pub report_step: usize,
    #[serde(default)]
    pub branches: Vec<Vec<WellResultPoint>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimWellRecord {
    pub name: String,
    #[serde(default)]
    pub frames: Vec<SimWellFrameRecord>,
}

/// RFT data of one well at one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RftRecord {
    pub well_name: String,
    pub date: Timestamp,
    #[serde(default)]
    pub channels: BTreeSet<RftChannelType>,
    #[serde(default)]
    pub cells: Vec<RftCellRates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCaseRecord {
    pub case: CaseHandle,
    #[serde(default)]
    pub report_dates: Vec<Timestamp>,
    #[serde(default)]
    pub sim_wells: Vec<SimWellRecord>,
    #[serde(default)]
    pub rft: Vec<RftRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LasFileRecord {
    pub file: LasFileHandle,
    #[serde(default)]
    pub date: Option<Timestamp>,
    #[serde(default)]
    pub flow_log: Option<LasFlowLog>,
}

/// Well name → RFT dates.
pub type WellTimeSteps = BTreeMap<String, BTreeSet<Timestamp>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCaseRecord {
    pub case: SummaryCaseHandle,
    #[serde(default)]
    pub rft_time_steps: WellTimeSteps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedDataRecord {
    pub data: ObservedDataHandle,
    #[serde(default)]
    pub time_steps: WellTimeSteps,
}

// ============================================================================
// ProjectSnapshot
// ============================================================================

/// Read-only project model implementing every provider trait.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub well_paths: Vec<WellPathRecord>,
    #[serde(default)]
    pub grid_cases: Vec<GridCaseRecord>,
    #[serde(default)]
    pub las_files: Vec<LasFileRecord>,
    #[serde(default)]
    pub summary_cases: Vec<SummaryCaseRecord>,
    #[serde(default)]
    pub observed_fmu: Vec<ObservedDataRecord>,
    #[serde(default)]
    pub pressure_depth: Vec<ObservedDataRecord>,
    /// Sources selected by the user for the plot
    #[serde(default)]
    pub selected_sources: Vec<DataSourceKey>,
}

impl ProjectSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let snapshot = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            grid_cases = snapshot.grid_cases.len(),
            las_files = snapshot.las_files.len(),
            "Loaded project snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every well name the snapshot knows about.
    pub fn well_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.well_paths.iter().map(|w| w.name.clone()).collect();
        for grid in &self.grid_cases {
            names.extend(grid.sim_wells.iter().map(|w| w.name.clone()));
            names.extend(grid.rft.iter().map(|r| r.well_name.clone()));
        }
        names.extend(
            self.las_files
                .iter()
                .filter(|f| !f.file.well_name.is_empty())
                .map(|f| f.file.well_name.clone()),
        );
        names
    }

    fn grid_case(&self, case: &CaseHandle) -> Option<&GridCaseRecord> {
        self.grid_cases.iter().find(|g| g.case.case_id == case.case_id)
    }

    fn sim_well(&self, case: &CaseHandle, sim_well_name: &str) -> Option<&SimWellRecord> {
        self.grid_case(case)?
            .sim_wells
            .iter()
            .find(|w| w.name == sim_well_name)
    }

    fn las_file(&self, file: &LasFileHandle) -> Option<&LasFileRecord> {
        self.las_files
            .iter()
            .find(|f| f.file.file_name == file.file_name && f.file.well_name == file.well_name)
    }

    fn observed_time_steps(
        records: &[ObservedDataRecord],
        data: &ObservedDataHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp> {
        records
            .iter()
            .find(|r| r.data.name == data.name)
            .and_then(|r| r.time_steps.get(well_name))
            .cloned()
            .unwrap_or_default()
    }
}

impl TimeStepProvider for ProjectSnapshot {
    fn simulation_well_name(&self, well_name: &str) -> String {
        self.well_paths
            .iter()
            .find(|w| w.name == well_name)
            .and_then(|w| w.sim_well_name.clone())
            .unwrap_or_else(|| well_name.to_string())
    }

    fn las_file_date(&self, file: &LasFileHandle) -> Option<Timestamp> {
        self.las_file(file)?.date
    }

    fn rft_time_steps(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        channels: &ChannelFilter,
    ) -> BTreeSet<Timestamp> {
        let Some(grid) = self.grid_case(case) else {
            return BTreeSet::new();
        };
        grid.rft
            .iter()
            .filter(|r| r.well_name == sim_well_name)
            .filter(|r| channels.is_empty() || r.channels.iter().any(|c| channels.contains(c)))
            .map(|r| r.date)
            .collect()
    }

    fn report_time_steps(&self, case: &CaseHandle) -> Vec<Timestamp> {
        self.grid_case(case).map(|g| g.report_dates.clone()).unwrap_or_default()
    }

    fn has_sim_well(&self, case: &CaseHandle, sim_well_name: &str) -> bool {
        self.sim_well(case, sim_well_name).is_some()
    }

    fn has_well_result(&self, case: &CaseHandle, sim_well_name: &str, report_step: usize) -> bool {
        self.sim_well(case, sim_well_name)
            .is_some_and(|w| w.frames.iter().any(|f| f.report_step == report_step))
    }

    fn summary_rft_time_steps(
        &self,
        summary_case: &SummaryCaseHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp> {
        self.summary_cases
            .iter()
            .find(|s| s.case.name == summary_case.name)
            .and_then(|s| s.rft_time_steps.get(well_name))
            .cloned()
            .unwrap_or_default()
    }

    fn fmu_rft_time_steps(
        &self,
        data: &ObservedDataHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp> {
        Self::observed_time_steps(&self.observed_fmu, data, well_name)
    }

    fn pressure_depth_time_steps(
        &self,
        data: &ObservedDataHandle,
        well_name: &str,
    ) -> BTreeSet<Timestamp> {
        Self::observed_time_steps(&self.pressure_depth, data, well_name)
    }
}

impl FlowDataProvider for ProjectSnapshot {
    fn rft_cell_rates(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
    ) -> Vec<RftCellRates> {
        self.grid_case(case)
            .and_then(|g| {
                g.rft
                    .iter()
                    .find(|r| r.well_name == sim_well_name && r.date == time_step)
            })
            .map(|r| r.cells.clone())
            .unwrap_or_default()
    }

    fn sim_well_result_frame(
        &self,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
    ) -> Option<Vec<Vec<WellResultPoint>>> {
        let grid = self.grid_case(case)?;
        let report_step = grid.report_dates.iter().position(|d| *d == time_step)?;
        self.sim_well(case, sim_well_name)?
            .frames
            .iter()
            .find(|f| f.report_step == report_step)
            .map(|f| f.branches.clone())
    }

    fn las_flow_log(&self, file: &LasFileHandle) -> Option<LasFlowLog> {
        self.las_file(file)?.flow_log.clone()
    }
}

impl WellPathGeometryProvider for ProjectSnapshot {
    fn cell_intersections(&self, well_name: &str, case: &CaseHandle) -> Vec<CellIntersection> {
        self.well_paths
            .iter()
            .find(|w| w.name == well_name)
            .and_then(|w| w.intersections.iter().find(|i| i.case_id == case.case_id))
            .map(|i| i.segments.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
