//! Baseline reconciliation.
//!
//! Picks one bucket as the time baseline and snaps every other bucket onto
//! it, so the selection list shows one aligned row per relevant instant
//! instead of each source kind's raw dates.
//!
//! Baseline priority (first non-empty wins):
//!
//! 1. observed (LAS, FMU RFT, pressure/depth)
//! 2. simulation RFT
//! 3. summary RFT
//! 4. ensemble RFT
//!
//! Grid-model dates never act as baseline. With no baseline at all, the grid
//! bucket is the timeline as-is.

use std::collections::BTreeSet;
use tracing::debug;

use super::collector::{CollectedTimeSteps, TimeStepMap};
use super::ReconciledTimeline;
use crate::source::SourceCategory;
use crate::types::Timestamp;

const BASELINE_PRIORITY: [SourceCategory; 4] = [
    SourceCategory::Observed,
    SourceCategory::SimulationRft,
    SourceCategory::SummaryRft,
    SourceCategory::EnsembleRft,
];

const SNAPPED_BUCKETS: [SourceCategory; 4] = [
    SourceCategory::SimulationRft,
    SourceCategory::GridModel,
    SourceCategory::SummaryRft,
    SourceCategory::EnsembleRft,
];

/// Available time steps that match or bracket each baseline time step.
///
/// For every base time, the first available time at or after it is taken;
/// when that is not an exact match, the latest available time before the
/// base time is taken too. If nothing matched at all but both sets have
/// data, the latest available time is returned alone.
pub fn find_matching_or_adjacent_time_steps(
    base_time_line: &BTreeSet<Timestamp>,
    available: &BTreeSet<Timestamp>,
) -> BTreeSet<Timestamp> {
    let mut result = BTreeSet::new();

    for base in base_time_line {
        let Some(matched) = available.range(base..).next() else {
            continue;
        };
        result.insert(*matched);
        if matched != base {
            if let Some(before) = available.range(..base).next_back() {
                result.insert(*before);
            }
        }
    }

    // Only historical data before the whole base window: keep the latest.
    if result.is_empty() && !base_time_line.is_empty() {
        if let Some(last) = available.last() {
            result.insert(*last);
        }
    }

    result
}

fn time_steps_of(map: &TimeStepMap) -> BTreeSet<Timestamp> {
    map.keys().copied().collect()
}

/// Bucket acting as the time baseline, if any bucket qualifies.
pub fn baseline_category(collected: &CollectedTimeSteps) -> Option<SourceCategory> {
    BASELINE_PRIORITY
        .into_iter()
        .find(|category| !collected.bucket(*category).is_empty())
}

/// Reconcile collected time steps into the final timeline.
///
/// `add_first_grid_step` forces the earliest grid-model date into the
/// result (the "time zero" pressure reference).
pub fn reconcile(collected: &CollectedTimeSteps, add_first_grid_step: bool) -> ReconciledTimeline {
    let Some(baseline) = baseline_category(collected) else {
        debug!(grid_steps = collected.grid_model.len(), "No baseline, using grid time steps");
        return ReconciledTimeline::from(collected.grid_model.clone());
    };

    let base_time_steps = time_steps_of(collected.bucket(baseline));

    let mut selected: BTreeSet<Timestamp> = BTreeSet::new();
    for category in SNAPPED_BUCKETS {
        let bucket_steps = time_steps_of(collected.bucket(category));
        selected.extend(find_matching_or_adjacent_time_steps(&base_time_steps, &bucket_steps));
    }
    if add_first_grid_step {
        if let Some(first) = collected.grid_model.keys().next() {
            selected.insert(*first);
        }
    }

    let mut merged = collected.observed.clone();
    for time_step in &selected {
        for category in SNAPPED_BUCKETS {
            if let Some(sources) = collected.bucket(category).get(time_step) {
                merged
                    .entry(*time_step)
                    .or_default()
                    .extend(sources.iter().cloned());
            }
        }
    }

    debug!(
        baseline = ?baseline,
        base_steps = base_time_steps.len(),
        result_steps = merged.len(),
        "Reconciled time steps"
    );

    ReconciledTimeline::from(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CaseHandle, DataSourceKey};
    use chrono::{TimeZone, Utc};

    fn at(h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2022, 5, 1, h, 0, 0).single().expect("valid time")
    }

    fn set(hours: &[u32]) -> BTreeSet<Timestamp> {
        hours.iter().map(|h| at(*h)).collect()
    }

    #[test]
    fn test_adjacent_snap() {
        let result = find_matching_or_adjacent_time_steps(&set(&[10]), &set(&[9, 11, 12]));
        assert_eq!(result, set(&[9, 11]));
    }

    #[test]
    fn test_exact_match_adds_no_neighbour() {
        let result = find_matching_or_adjacent_time_steps(&set(&[10]), &set(&[9, 10, 12]));
        assert_eq!(result, set(&[10]));
    }

    #[test]
    fn test_first_available_after_base_has_no_earlier() {
        let result = find_matching_or_adjacent_time_steps(&set(&[8]), &set(&[9, 11]));
        assert_eq!(result, set(&[9]));
    }

    #[test]
    fn test_only_historical_data_keeps_latest() {
        let result = find_matching_or_adjacent_time_steps(&set(&[20]), &set(&[3, 5, 7]));
        assert_eq!(result, set(&[7]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(find_matching_or_adjacent_time_steps(&BTreeSet::new(), &set(&[1])).is_empty());
        assert!(find_matching_or_adjacent_time_steps(&set(&[1]), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_no_baseline_uses_grid() {
        let grid = DataSourceKey::GridCellData {
            case: CaseHandle {
                case_id: 1,
                name: "GRID".into(),
                unit_system: Default::default(),
            },
        };
        let mut collected = CollectedTimeSteps::default();
        collected.insert_all(&grid, &set(&[1, 2]));
        assert_eq!(baseline_category(&collected), None);
        let timeline = reconcile(&collected, false);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_empty_collection_is_empty_timeline() {
        let timeline = reconcile(&CollectedTimeSteps::default(), true);
        assert!(timeline.is_empty());
    }
}
