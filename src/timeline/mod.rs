//! Time-Step Reconciliation
//!
//! Builds the list of selectable time steps for a well from a selection of
//! RFT/PLT data sources:
//!
//! 1. `collector`: ask the providers which dates each source has
//! 2. `reconcile`: snap every source kind onto one baseline timeline
//! 3. `options`: turn the timeline into labelled selection entries
//! 4. `curve_defs`: expand selected dates back into concrete curves
//!
//! Everything here is a pure function of its inputs. The timeline is rebuilt
//! from scratch whenever the sources, the well or the case data change.
//!
//! ## Usage
//!
//! ```ignore
//! let timeline = timeline::relevant_time_steps(&snapshot, "A-1", &sources, &channels);
//! for option in timeline::time_step_options(&timeline) {
//!     println!("{}", option.label);
//! }
//! ```

mod collector;
mod curve_defs;
mod options;
mod reconcile;

pub use collector::{
    available_sim_well_time_steps, collect, collect_by_category, ensemble_rft_time_steps,
    source_time_steps, CollectedTimeSteps, TimeStepMap,
};
pub use curve_defs::{curve_defs_from_time_steps, RftPltCurveDefinition};
pub use options::{
    create_time_format_string, format_time_step, resolve_selection, source_tags, time_format_for,
    time_step_options, TimeStepOption,
};
pub use reconcile::{baseline_category, find_matching_or_adjacent_time_steps, reconcile};

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::provider::TimeStepProvider;
use crate::source::DataSourceKey;
use crate::types::{ChannelFilter, RftChannelType, Timestamp};

// ============================================================================
// ReconciledTimeline
// ============================================================================

/// Final selectable time steps, each with the sources that contribute.
///
/// Keys are strictly increasing and every source set is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledTimeline(TimeStepMap);

impl ReconciledTimeline {
    pub fn time_steps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &BTreeSet<DataSourceKey>)> {
        self.0.iter()
    }

    pub fn sources_at(&self, time_step: &Timestamp) -> Option<&BTreeSet<DataSourceKey>> {
        self.0.get(time_step)
    }

    pub fn contains(&self, time_step: &Timestamp) -> bool {
        self.0.contains_key(time_step)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> TimeStepMap {
        self.0
    }
}

impl From<TimeStepMap> for ReconciledTimeline {
    fn from(mut map: TimeStepMap) -> Self {
        map.retain(|_, sources| !sources.is_empty());
        Self(map)
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Selectable time steps for one well.
///
/// A pressure channel in the filter requests the first grid report step as
/// a "time zero" reference.
pub fn relevant_time_steps<P>(
    provider: &P,
    well_name: &str,
    sources: &BTreeSet<DataSourceKey>,
    channels: &ChannelFilter,
) -> ReconciledTimeline
where
    P: TimeStepProvider + ?Sized,
{
    let add_first_report_step = channels.contains(&RftChannelType::Pressure);
    let collected =
        collect_by_category(provider, sources, well_name, channels, add_first_report_step);
    reconcile(&collected, add_first_report_step)
}

/// Independent timelines for many wells, computed in parallel.
pub fn relevant_time_steps_for_wells<P>(
    provider: &P,
    well_names: &[String],
    sources: &BTreeSet<DataSourceKey>,
    channels: &ChannelFilter,
) -> BTreeMap<String, ReconciledTimeline>
where
    P: TimeStepProvider + Sync + ?Sized,
{
    well_names
        .par_iter()
        .map(|well| (well.clone(), relevant_time_steps(provider, well, sources, channels)))
        .collect()
}
