//! Pipe branch construction from trajectory cell intersections.

use super::result_point::{CellIntersection, PipeBranch, WellResultPoint};
use crate::provider::CellResultProvider;
use crate::types::Timestamp;

/// Walk the well path's cell intersections and match each against the cell
/// results.
///
/// A matched segment contributes its start and end coordinates and MDs plus
/// the cell's result point, followed by an invalid point for the line to the
/// next cell unless it is the final segment. An unmatched segment is
/// skipped; when it is the final segment, the dangling separator left by the
/// previous match is removed.
pub fn build_pipe_branch<C>(
    intersections: &[CellIntersection],
    cells: &C,
    time_step: Timestamp,
) -> PipeBranch
where
    C: CellResultProvider + ?Sized,
{
    let mut branch = PipeBranch::default();
    let last_idx = intersections.len().saturating_sub(1);

    for (idx, segment) in intersections.iter().enumerate() {
        let Some(point) = cells.flow_at_cell(segment.global_cell_index, time_step) else {
            if idx == last_idx {
                branch.result_points.pop();
            }
            continue;
        };

        branch.coords.push(segment.start_point);
        branch.measured_depths.push(segment.start_md);
        branch.coords.push(segment.end_point);
        branch.measured_depths.push(segment.end_md);

        branch.result_points.push(point);
        if idx < last_idx {
            branch.result_points.push(WellResultPoint::invalid());
        }
    }

    branch
}
