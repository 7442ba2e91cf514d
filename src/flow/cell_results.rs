//! Cell result lookups for one source at one date.
//!
//! `RftCellResults` wraps RFT connection rates (gas converted to oil
//! equivalents), `SimWellCellResults` wraps a simulation-well result frame.
//! Both answer `CellResultProvider::flow_at_cell` for the date they were
//! built for and nothing else.

use std::collections::BTreeMap;

use super::result_point::WellResultPoint;
use crate::config::FlowConfig;
use crate::provider::{CellResultProvider, FlowDataProvider, RftCellRates};
use crate::source::CaseHandle;
use crate::types::{convert_surface_gas_rate_to_oil_equivalent, Timestamp, UnitSystem};

/// Cell lookup over RFT connection rates.
#[derive(Debug, Clone)]
pub struct RftCellResults {
    time_step: Timestamp,
    points: BTreeMap<usize, WellResultPoint>,
}

impl RftCellResults {
    pub fn new(
        rates: &[RftCellRates],
        unit_system: UnitSystem,
        time_step: Timestamp,
        flow: &FlowConfig,
    ) -> Self {
        let points = rates
            .iter()
            .map(|r| {
                let gas = convert_surface_gas_rate_to_oil_equivalent(unit_system, r.gas, flow);
                (
                    r.global_cell_index,
                    WellResultPoint::with_phase_rates(r.global_cell_index, r.oil, gas, r.water),
                )
            })
            .collect();
        Self { time_step, points }
    }

    pub fn from_provider<P>(
        provider: &P,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
        flow: &FlowConfig,
    ) -> Self
    where
        P: FlowDataProvider + ?Sized,
    {
        let rates = provider.rft_cell_rates(case, sim_well_name, time_step);
        Self::new(&rates, case.unit_system, time_step, flow)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl CellResultProvider for RftCellResults {
    fn flow_at_cell(
        &self,
        global_cell_index: usize,
        time_step: Timestamp,
    ) -> Option<WellResultPoint> {
        if time_step != self.time_step {
            return None;
        }
        self.points.get(&global_cell_index).copied()
    }
}

/// Cell lookup over a simulation-well result frame.
#[derive(Debug, Clone)]
pub struct SimWellCellResults {
    time_step: Timestamp,
    points: BTreeMap<usize, WellResultPoint>,
}

impl SimWellCellResults {
    /// Index the frame's result points by reservoir cell index.
    ///
    /// Points without a cell are not addressable and are left out. When a
    /// cell appears in several branches, the last occurrence wins.
    pub fn new<F>(
        branches: &[Vec<WellResultPoint>],
        time_step: Timestamp,
        reservoir_cell_index: F,
    ) -> Self
    where
        F: Fn(&WellResultPoint) -> Option<usize>,
    {
        let mut points = BTreeMap::new();
        for point in branches.iter().flatten() {
            if let Some(index) = reservoir_cell_index(point) {
                points.insert(index, *point);
            }
        }
        Self { time_step, points }
    }

    /// Build from the provider's frame. `None` when the well has no result
    /// at that date.
    pub fn from_provider<P>(
        provider: &P,
        case: &CaseHandle,
        sim_well_name: &str,
        time_step: Timestamp,
    ) -> Option<Self>
    where
        P: FlowDataProvider + ?Sized,
    {
        let frame = provider.sim_well_result_frame(case, sim_well_name, time_step)?;
        Some(Self::new(&frame, time_step, |point| {
            point.cell.map(|cell| provider.reservoir_cell_index(case, cell))
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl CellResultProvider for SimWellCellResults {
    fn flow_at_cell(
        &self,
        global_cell_index: usize,
        time_step: Timestamp,
    ) -> Option<WellResultPoint> {
        if time_step != self.time_step {
            return None;
        }
        self.points.get(&global_cell_index).copied()
    }
}
