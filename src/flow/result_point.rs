//! Well result points, trajectory cell intersections and pipe branches.

use serde::{Deserialize, Serialize};

/// A 3D coordinate in the reservoir frame (x, y, z with z positive up).
pub type Vec3 = [f64; 3];

/// Grid cell identity: grid index (0 = main grid) and cell index within it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    pub grid_index: usize,
    pub cell_index: usize,
}

/// Multi-segment well identity of a result point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SegmentId {
    pub branch_id: i32,
    pub segment_id: i32,
}

/// One sample along a well's flow path.
///
/// The default value is the invalid point: no cell, closed, zero rates.
/// Invalid points mark gaps between cells; they contribute no flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WellResultPoint {
    #[serde(default)]
    pub cell: Option<CellId>,
    #[serde(default)]
    pub segment: Option<SegmentId>,
    #[serde(default)]
    pub is_open: bool,
    /// Reservoir-condition total rate. `None` when not applicable (RFT sources).
    #[serde(default)]
    pub flow_rate: Option<f64>,
    #[serde(default)]
    pub oil_rate: f64,
    #[serde(default)]
    pub gas_rate: f64,
    #[serde(default)]
    pub water_rate: f64,
}

impl WellResultPoint {
    /// Separator / gap marker.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Open main-grid cell with surface phase rates and no total rate.
    pub fn with_phase_rates(global_cell_index: usize, oil: f64, gas: f64, water: f64) -> Self {
        Self {
            cell: Some(CellId {
                grid_index: 0,
                cell_index: global_cell_index,
            }),
            segment: None,
            is_open: true,
            flow_rate: None,
            oil_rate: oil,
            gas_rate: gas,
            water_rate: water,
        }
    }

    pub fn is_cell(&self) -> bool {
        self.cell.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.cell.is_some() || self.segment.is_some()
    }

    /// Same connection: same cell, same segment and same open state.
    pub fn is_same_connection(&self, other: &Self) -> bool {
        self.cell == other.cell && self.segment == other.segment && self.is_open == other.is_open
    }

    /// Total rate used by the total tracer. Not-applicable counts as zero.
    pub fn total_rate(&self) -> f64 {
        self.flow_rate.unwrap_or(0.0)
    }
}

/// One trajectory segment crossing one grid cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CellIntersection {
    pub start_point: Vec3,
    pub end_point: Vec3,
    pub start_md: f64,
    pub end_md: f64,
    pub global_cell_index: usize,
}

/// Ordered trajectory samples of one well branch.
///
/// `result_points[i]` describes the piece of centre line between
/// `coords[i]` and `coords[i + 1]`, so a non-empty branch always has one
/// more coordinate than result points.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipeBranch {
    pub coords: Vec<Vec3>,
    pub measured_depths: Vec<f64>,
    pub result_points: Vec<WellResultPoint>,
}

impl PipeBranch {
    pub fn is_empty(&self) -> bool {
        self.result_points.is_empty()
    }

    /// Number of result points that refer to a cell (gap markers excluded).
    pub fn cell_point_count(&self) -> usize {
        self.result_points.iter().filter(|p| p.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_point_has_no_flow() {
        let p = WellResultPoint::invalid();
        assert!(!p.is_valid());
        assert_eq!(p.total_rate(), 0.0);
        assert_eq!(p.oil_rate + p.gas_rate + p.water_rate, 0.0);
    }

    #[test]
    fn test_same_connection_ignores_rates() {
        let a = WellResultPoint::with_phase_rates(4, 1.0, 2.0, 3.0);
        let mut b = WellResultPoint::with_phase_rates(4, 9.0, 9.0, 9.0);
        assert!(a.is_same_connection(&b));
        b.is_open = false;
        assert!(!a.is_same_connection(&b));
        assert!(!a.is_same_connection(&WellResultPoint::invalid()));
    }
}
