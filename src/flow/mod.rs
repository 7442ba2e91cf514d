//! Accumulated well flow for PLT plots.
//!
//! - `result_point`: result points, cell intersections, pipe branches
//! - `cell_results`: per-date cell lookups over RFT and simulation-well data
//! - `branch`: pipe branch construction along the well path
//! - `accumulator`: cumulative flow per tracer along each branch
//! - `plt`: stacked curve assembly and unit consistency

mod accumulator;
mod branch;
mod cell_results;
pub mod plt;
mod result_point;

pub use accumulator::{AccumulatedWellFlow, TracerCurve, TracerMode};
pub use branch::build_pipe_branch;
pub use cell_results::{RftCellResults, SimWellCellResults};
pub use plt::{
    plt_axis_title, stacked_curves, unit_consistency, PltCurveOptions, PltCurveSet, PltWarning,
    StackedCurve, UnitConsistency,
};
pub use result_point::{CellId, CellIntersection, PipeBranch, SegmentId, Vec3, WellResultPoint};
