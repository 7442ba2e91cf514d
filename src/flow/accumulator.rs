//! Accumulated Well Flow
//!
//! Turns pipe branches into cumulative-flow-vs-depth curves per tracer.
//! Each branch is walked from its last result point (the toe) towards its
//! first, summing the connection flows so that the value at any depth is
//! the total flow entering the well below it.
//!
//! Two depth axes are produced:
//!
//! - pseudo length: one step per cell span, stored twice (bottom of the cell
//!   with the flow accumulated so far, top of the cell with the cell's own
//!   contribution added), so the curve is a step function
//! - connection number: one entry per distinct connection, counted from the
//!   top of the branch
//!
//! A branch whose first result point shares its connection with a point on
//! another branch is a downstream branch. It is accumulated when the walk
//! reaches that connection and its total is added there. Branches with very
//! few result points are also added to the connection's own flow, since
//! they are too short to show up on their own.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::result_point::{PipeBranch, Vec3, WellResultPoint};
use crate::config::FlowConfig;
use crate::types::tracer;

/// What the tracers of an accumulation represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerMode {
    /// Oil, gas and water surface rates, sorted by total flow
    Phases,
    /// Reservoir-condition total rate only
    Total,
}

/// Stored flow along one branch.
#[derive(Debug, Clone, Default)]
struct BranchFlow {
    depth_values_from_top: Vec<f64>,
    true_vertical_depth: Vec<f64>,
    acc_flow_per_tracer: BTreeMap<String, Vec<f64>>,
    flow_per_tracer: BTreeMap<String, Vec<f64>>,
}

impl BranchFlow {
    fn store(
        &mut self,
        tracers: &[String],
        depth: f64,
        tvd: Option<f64>,
        acc_flow: &[f64],
        flow: &[f64],
    ) {
        for (idx, name) in tracers.iter().enumerate() {
            self.acc_flow_per_tracer
                .entry(name.clone())
                .or_default()
                .push(acc_flow[idx]);
            self.flow_per_tracer
                .entry(name.clone())
                .or_default()
                .push(flow[idx]);
        }
        self.depth_values_from_top.push(depth);
        if let Some(tvd) = tvd {
            self.true_vertical_depth.push(tvd);
        }
    }

    /// Final accumulated value per tracer, in tracer order.
    fn accumulated_totals(&self, tracers: &[String]) -> Vec<f64> {
        tracers
            .iter()
            .map(|name| {
                self.acc_flow_per_tracer
                    .get(name)
                    .and_then(|values| values.last())
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect()
    }
}

/// One accumulated curve ready for stacking.
#[derive(Debug, Clone, PartialEq)]
pub struct TracerCurve {
    pub tracer: String,
    pub depths: Vec<f64>,
    pub accumulated_flow: Vec<f64>,
}

/// Accumulated flow of a well, per tracer and branch.
#[derive(Debug, Clone)]
pub struct AccumulatedWellFlow {
    branches: Vec<PipeBranch>,
    mode: TracerMode,
    tracer_names: Vec<String>,
    connection_flow: Vec<BranchFlow>,
    pseudo_length_flow: Vec<BranchFlow>,
    short_branch_point_limit: usize,
}

fn add_flow(acc: &mut [f64], flow: &[f64]) {
    for (a, f) in acc.iter_mut().zip(flow) {
        *a += f;
    }
}

fn empty_slice<'a>() -> &'a [f64] {
    &[]
}

fn same_connection_identity(a: &WellResultPoint, b: &WellResultPoint) -> bool {
    a.cell == b.cell && a.segment == b.segment
}

/// Per result point, the index of its connection counted from the bottom.
///
/// Invalid points inherit the index of the connection below them.
fn connection_index_from_bottom(points: &[WellResultPoint]) -> Vec<usize> {
    let mut indices = vec![0; points.len()];
    let Some(bottom) = points.last() else {
        return indices;
    };

    let mut current = *bottom;
    let mut conn_idx = 0;
    for idx in (0..points.len()).rev() {
        let point = &points[idx];
        if point.is_valid() && !same_connection_identity(point, &current) {
            conn_idx += 1;
            current = *point;
        }
        indices[idx] = conn_idx;
    }
    indices
}

/// Depth values for the coordinates of a branch.
///
/// Measured depths are used as-is when present for every coordinate.
/// Otherwise the cumulative centre-line length from the first coordinate is
/// used, offset by `start_depth`.
fn branch_depth_values(branch: &PipeBranch, start_depth: f64) -> Vec<f64> {
    if !branch.measured_depths.is_empty()
        && branch.measured_depths.len() == branch.coords.len()
    {
        return branch.measured_depths.clone();
    }

    let mut depths = Vec::with_capacity(branch.coords.len());
    let mut length = start_depth;
    let mut previous: Option<&Vec3> = None;
    for coord in &branch.coords {
        if let Some(p) = previous {
            length += ((coord[0] - p[0]).powi(2)
                + (coord[1] - p[1]).powi(2)
                + (coord[2] - p[2]).powi(2))
            .sqrt();
        }
        depths.push(length);
        previous = Some(coord);
    }
    depths
}

impl AccumulatedWellFlow {
    /// Accumulate flow over the given branches. Branch 0 is the main branch.
    ///
    /// Downstream branches with at most `flow.short_branch_point_limit`
    /// result points are folded into their connecting cell's own flow.
    pub fn new(branches: Vec<PipeBranch>, mode: TracerMode, flow: &FlowConfig) -> Self {
        let branches: Vec<PipeBranch> = branches
            .into_iter()
            .enumerate()
            .map(|(idx, branch)| {
                if !branch.is_empty() && branch.coords.len() != branch.result_points.len() + 1 {
                    warn!(
                        branch = idx,
                        coords = branch.coords.len(),
                        points = branch.result_points.len(),
                        "Pipe branch coordinates do not bracket its result points, ignoring branch"
                    );
                    PipeBranch::default()
                } else {
                    branch
                }
            })
            .collect();

        let tracer_names: Vec<String> = match mode {
            TracerMode::Phases => vec![
                tracer::OIL.into(),
                tracer::GAS.into(),
                tracer::WATER.into(),
            ],
            TracerMode::Total => vec![tracer::TOTAL.into()],
        };

        let branch_count = branches.len();
        let mut acc = Self {
            branches,
            mode,
            tracer_names,
            connection_flow: vec![BranchFlow::default(); branch_count],
            pseudo_length_flow: vec![BranchFlow::default(); branch_count],
            short_branch_point_limit: flow.short_branch_point_limit,
        };

        if branch_count > 0 {
            let mut visited = vec![false; branch_count];
            acc.accumulate_per_connection(0, 1, &mut visited);
            let mut visited = vec![false; branch_count];
            acc.accumulate_per_pseudo_length(0, 0.0, &mut visited);
            if mode == TracerMode::Phases {
                acc.sort_tracers();
            }
        }

        debug!(
            branches = branch_count,
            tracers = acc.tracer_names.len(),
            "Accumulated well flow"
        );

        acc
    }

    /// Single-branch convenience.
    pub fn from_branch(branch: PipeBranch, mode: TracerMode, flow: &FlowConfig) -> Self {
        Self::new(vec![branch], mode, flow)
    }

    pub fn mode(&self) -> TracerMode {
        self.mode
    }

    /// Tracer names; in phase mode sorted by descending absolute total flow.
    pub fn tracer_names(&self) -> &[String] {
        &self.tracer_names
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn connection_numbers_from_top(&self, branch_idx: usize) -> &[f64] {
        self.connection_flow
            .get(branch_idx)
            .map_or_else(empty_slice, |f| f.depth_values_from_top.as_slice())
    }

    pub fn accumulated_tracer_flow_per_connection(
        &self,
        tracer_name: &str,
        branch_idx: usize,
    ) -> &[f64] {
        Self::tracer_values(&self.connection_flow, branch_idx, tracer_name, true)
    }

    pub fn tracer_flow_per_connection(&self, tracer_name: &str, branch_idx: usize) -> &[f64] {
        Self::tracer_values(&self.connection_flow, branch_idx, tracer_name, false)
    }

    pub fn pseudo_length_from_top(&self, branch_idx: usize) -> &[f64] {
        self.pseudo_length_flow
            .get(branch_idx)
            .map_or_else(empty_slice, |f| f.depth_values_from_top.as_slice())
    }

    /// True vertical depth (positive down) at each pseudo-length sample.
    pub fn true_vertical_depth(&self, branch_idx: usize) -> &[f64] {
        self.pseudo_length_flow
            .get(branch_idx)
            .map_or_else(empty_slice, |f| f.true_vertical_depth.as_slice())
    }

    pub fn accumulated_tracer_flow_per_pseudo_length(
        &self,
        tracer_name: &str,
        branch_idx: usize,
    ) -> &[f64] {
        Self::tracer_values(&self.pseudo_length_flow, branch_idx, tracer_name, true)
    }

    pub fn tracer_flow_per_pseudo_length(&self, tracer_name: &str, branch_idx: usize) -> &[f64] {
        Self::tracer_values(&self.pseudo_length_flow, branch_idx, tracer_name, false)
    }

    fn tracer_values<'a>(
        flows: &'a [BranchFlow],
        branch_idx: usize,
        tracer_name: &str,
        accumulated: bool,
    ) -> &'a [f64] {
        flows
            .get(branch_idx)
            .and_then(|f| {
                if accumulated {
                    f.acc_flow_per_tracer.get(tracer_name)
                } else {
                    f.flow_per_tracer.get(tracer_name)
                }
            })
            .map_or_else(empty_slice, Vec::as_slice)
    }

    /// Accumulated pseudo-length curve per tracer for one branch.
    pub fn pseudo_length_curves(&self, branch_idx: usize) -> Vec<TracerCurve> {
        let depths = self.pseudo_length_from_top(branch_idx).to_vec();
        self.tracer_names
            .iter()
            .map(|name| TracerCurve {
                tracer: name.clone(),
                depths: depths.clone(),
                accumulated_flow: self
                    .accumulated_tracer_flow_per_pseudo_length(name, branch_idx)
                    .to_vec(),
            })
            .collect()
    }

    /// Total well flow per tracer, read at the top of the main branch.
    pub fn total_well_flow_per_tracer(&self) -> Vec<(String, f64)> {
        self.tracer_names
            .iter()
            .map(|name| {
                let total = self
                    .accumulated_tracer_flow_per_connection(name, 0)
                    .last()
                    .copied()
                    .unwrap_or(0.0);
                (name.clone(), total)
            })
            .collect()
    }

    /// Fraction of the total well flow per tracer. Empty when the well has
    /// no flow.
    pub fn total_tracer_fractions(&self) -> Vec<(String, f64)> {
        let totals = self.total_well_flow_per_tracer();
        let sum: f64 = totals.iter().map(|(_, v)| v).sum();
        if sum == 0.0 {
            return Vec::new();
        }
        totals.into_iter().map(|(name, v)| (name, v / sum)).collect()
    }

    // ========================================================================
    // Accumulation
    // ========================================================================

    fn cell_flow_per_tracer(&self, point: &WellResultPoint) -> Vec<f64> {
        match self.mode {
            TracerMode::Phases => vec![point.oil_rate, point.gas_rate, point.water_rate],
            TracerMode::Total => vec![point.total_rate()],
        }
    }

    /// Other branches starting at the given connection.
    fn downstream_branches(&self, branch_idx: usize, connection: &WellResultPoint) -> Vec<usize> {
        if !connection.is_valid() {
            return Vec::new();
        }
        self.branches
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != branch_idx)
            .filter(|(_, b)| {
                b.result_points
                    .first()
                    .is_some_and(|first| same_connection_identity(first, connection))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    fn is_short_branch(&self, branch_idx: usize) -> bool {
        self.branches[branch_idx].result_points.len() <= self.short_branch_point_limit
    }

    fn accumulate_per_connection(
        &mut self,
        branch_idx: usize,
        start_connection_number: usize,
        visited: &mut [bool],
    ) {
        visited[branch_idx] = true;

        let points = self.branches[branch_idx].result_points.clone();
        let conn_from_bottom = connection_index_from_bottom(&points);
        let top_index = conn_from_bottom.first().copied().unwrap_or(0);

        let mut acc_flow = vec![0.0; self.tracer_names.len()];
        let mut previous_conn: Option<usize> = None;

        for seg_idx in (0..points.len()).rev() {
            if previous_conn == Some(conn_from_bottom[seg_idx]) {
                continue;
            }
            previous_conn = Some(conn_from_bottom[seg_idx]);

            let point = &points[seg_idx];
            let mut flow = self.cell_flow_per_tracer(point);
            add_flow(&mut acc_flow, &flow);

            let conn_number = top_index - conn_from_bottom[seg_idx] + start_connection_number;

            for ds_idx in self.downstream_branches(branch_idx, point) {
                if visited[ds_idx] {
                    continue;
                }
                self.accumulate_per_connection(ds_idx, conn_number, visited);
                let ds_acc = self.connection_flow[ds_idx].accumulated_totals(&self.tracer_names);
                add_flow(&mut acc_flow, &ds_acc);
                if self.is_short_branch(ds_idx) {
                    add_flow(&mut flow, &ds_acc);
                }
            }

            let tracers = self.tracer_names.clone();
            self.connection_flow[branch_idx].store(
                &tracers,
                conn_number as f64,
                None,
                &acc_flow,
                &flow,
            );
        }
    }

    fn accumulate_per_pseudo_length(
        &mut self,
        branch_idx: usize,
        start_depth: f64,
        visited: &mut [bool],
    ) {
        visited[branch_idx] = true;

        let branch = self.branches[branch_idx].clone();
        let points = &branch.result_points;
        if points.is_empty() {
            return;
        }
        let depths = branch_depth_values(&branch, start_depth);
        let tvd = |idx: usize| -branch.coords[idx][2];
        let tracers = self.tracer_names.clone();

        let mut acc_flow = vec![0.0; tracers.len()];
        let mut end = points.len();

        while end > 0 {
            // Cell span [upper, end) of equal connections
            let bottom = end;
            let current = points[end - 1];
            let mut upper = end - 1;
            while upper > 0 && current.is_same_connection(&points[upper - 1]) {
                upper -= 1;
            }
            end = upper;

            let point = &points[upper];
            let mut flow = self.cell_flow_per_tracer(point);

            self.pseudo_length_flow[branch_idx].store(
                &tracers,
                depths[bottom],
                Some(tvd(bottom)),
                &acc_flow,
                &flow,
            );
            add_flow(&mut acc_flow, &flow);
            self.pseudo_length_flow[branch_idx].store(
                &tracers,
                depths[upper],
                Some(tvd(upper)),
                &acc_flow,
                &flow,
            );

            let downstream = self.downstream_branches(branch_idx, point);
            for ds_idx in &downstream {
                if visited[*ds_idx] {
                    continue;
                }
                self.accumulate_per_pseudo_length(*ds_idx, depths[upper], visited);
                let ds_acc = self.pseudo_length_flow[*ds_idx].accumulated_totals(&tracers);
                add_flow(&mut acc_flow, &ds_acc);
                if self.is_short_branch(*ds_idx) {
                    add_flow(&mut flow, &ds_acc);
                }
            }

            if !downstream.is_empty() {
                self.pseudo_length_flow[branch_idx].store(
                    &tracers,
                    depths[upper],
                    Some(tvd(upper)),
                    &acc_flow,
                    &flow,
                );
            }
        }
    }

    /// Order tracers by descending absolute total flow. Ties keep their
    /// current order.
    fn sort_tracers(&mut self) {
        let mut keyed: Vec<(f64, String)> = self
            .tracer_names
            .iter()
            .map(|name| {
                let total = self
                    .accumulated_tracer_flow_per_connection(name, 0)
                    .last()
                    .map_or(0.0, |v| v.abs());
                (total, name.clone())
            })
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.tracer_names = keyed.into_iter().map(|(_, name)| name).collect();
    }
}
