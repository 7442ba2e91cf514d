//! Per-source time-step collection.
//!
//! Dispatches each selected source to the provider query for its kind and
//! groups the answers into a timestamp → sources mapping. Sources reporting
//! no time steps leave no trace in the result.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use crate::provider::TimeStepProvider;
use crate::source::{CaseHandle, DataSourceKey, EnsembleHandle, SourceCategory};
use crate::types::{ChannelFilter, Timestamp};

/// Timestamp → sources that have data at that time.
pub type TimeStepMap = BTreeMap<Timestamp, BTreeSet<DataSourceKey>>;

/// Collected time steps split into reconciliation buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedTimeSteps {
    /// LAS files, FMU RFT and pressure/depth data
    pub observed: TimeStepMap,
    pub simulation_rft: TimeStepMap,
    pub grid_model: TimeStepMap,
    pub summary_rft: TimeStepMap,
    pub ensemble_rft: TimeStepMap,
}

impl CollectedTimeSteps {
    pub fn bucket(&self, category: SourceCategory) -> &TimeStepMap {
        match category {
            SourceCategory::Observed => &self.observed,
            SourceCategory::SimulationRft => &self.simulation_rft,
            SourceCategory::GridModel => &self.grid_model,
            SourceCategory::SummaryRft => &self.summary_rft,
            SourceCategory::EnsembleRft => &self.ensemble_rft,
        }
    }

    fn bucket_mut(&mut self, category: SourceCategory) -> &mut TimeStepMap {
        match category {
            SourceCategory::Observed => &mut self.observed,
            SourceCategory::SimulationRft => &mut self.simulation_rft,
            SourceCategory::GridModel => &mut self.grid_model,
            SourceCategory::SummaryRft => &mut self.summary_rft,
            SourceCategory::EnsembleRft => &mut self.ensemble_rft,
        }
    }

    /// Record that `source` has data at every time in `time_steps`.
    pub fn insert_all(&mut self, source: &DataSourceKey, time_steps: &BTreeSet<Timestamp>) {
        let Some(category) = source.category() else {
            return;
        };
        let bucket = self.bucket_mut(category);
        for time_step in time_steps {
            bucket.entry(*time_step).or_default().insert(source.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
            && self.simulation_rft.is_empty()
            && self.grid_model.is_empty()
            && self.summary_rft.is_empty()
            && self.ensemble_rft.is_empty()
    }
}

/// Time steps of a grid case's simulation well.
///
/// Report step `i` is kept when the well has results there, or when it is
/// the first report step and `add_first_report_step` is set. A case without
/// the simulation well yields nothing.
pub fn available_sim_well_time_steps<P>(
    provider: &P,
    case: &CaseHandle,
    sim_well_name: &str,
    add_first_report_step: bool,
) -> BTreeSet<Timestamp>
where
    P: TimeStepProvider + ?Sized,
{
    if !provider.has_sim_well(case, sim_well_name) {
        return BTreeSet::new();
    }

    provider
        .report_time_steps(case)
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| {
            provider.has_well_result(case, sim_well_name, *idx)
                || (*idx == 0 && add_first_report_step)
        })
        .map(|(_, time_step)| time_step)
        .collect()
}

/// Union of RFT time steps over every summary case of an ensemble.
pub fn ensemble_rft_time_steps<P>(
    provider: &P,
    ensemble: &EnsembleHandle,
    well_name: &str,
) -> BTreeSet<Timestamp>
where
    P: TimeStepProvider + ?Sized,
{
    ensemble
        .members
        .iter()
        .flat_map(|member| provider.summary_rft_time_steps(member, well_name))
        .collect()
}

/// Time steps one source has for the well.
pub fn source_time_steps<P>(
    provider: &P,
    source: &DataSourceKey,
    well_name: &str,
    channels: &ChannelFilter,
    add_first_report_step: bool,
) -> BTreeSet<Timestamp>
where
    P: TimeStepProvider + ?Sized,
{
    match source {
        DataSourceKey::None => BTreeSet::new(),
        DataSourceKey::ObservedLasFile { file } => {
            provider.las_file_date(file).into_iter().collect()
        }
        DataSourceKey::SimWellRft { case } => {
            let sim_well_name = provider.simulation_well_name(well_name);
            provider.rft_time_steps(case, &sim_well_name, channels)
        }
        DataSourceKey::GridCellData { case } => {
            let sim_well_name = provider.simulation_well_name(well_name);
            available_sim_well_time_steps(provider, case, &sim_well_name, add_first_report_step)
        }
        DataSourceKey::SummaryRft { summary_case, .. } => {
            provider.summary_rft_time_steps(summary_case, well_name)
        }
        DataSourceKey::EnsembleRft { ensemble } => {
            ensemble_rft_time_steps(provider, ensemble, well_name)
        }
        DataSourceKey::ObservedFmuRft { data } => provider.fmu_rft_time_steps(data, well_name),
        DataSourceKey::ObservedPressureDepth { data } => {
            provider.pressure_depth_time_steps(data, well_name)
        }
    }
}

/// Collect time steps for every selected source, split by bucket.
pub fn collect_by_category<P>(
    provider: &P,
    sources: &BTreeSet<DataSourceKey>,
    well_name: &str,
    channels: &ChannelFilter,
    add_first_report_step: bool,
) -> CollectedTimeSteps
where
    P: TimeStepProvider + ?Sized,
{
    let mut collected = CollectedTimeSteps::default();

    for source in sources {
        if source.category().is_none() {
            trace!("Skipping empty data source key");
            continue;
        }
        let time_steps =
            source_time_steps(provider, source, well_name, channels, add_first_report_step);
        if time_steps.is_empty() {
            debug!(well = well_name, source = %source, "Source has no time steps");
            continue;
        }
        collected.insert_all(source, &time_steps);
    }

    debug!(
        well = well_name,
        observed = collected.observed.len(),
        rft = collected.simulation_rft.len(),
        grid = collected.grid_model.len(),
        summary = collected.summary_rft.len(),
        ensemble = collected.ensemble_rft.len(),
        "Collected time steps"
    );

    collected
}

/// Collect time steps for every selected source into one mapping.
pub fn collect<P>(
    provider: &P,
    sources: &BTreeSet<DataSourceKey>,
    well_name: &str,
    channels: &ChannelFilter,
    add_first_report_step: bool,
) -> TimeStepMap
where
    P: TimeStepProvider + ?Sized,
{
    let mut merged = TimeStepMap::new();
    for source in sources {
        let time_steps =
            source_time_steps(provider, source, well_name, channels, add_first_report_step);
        for time_step in time_steps {
            merged.entry(time_step).or_default().insert(source.clone());
        }
    }
    merged
}
