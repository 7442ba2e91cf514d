//! Curve definitions for the selected time steps.

use serde::Serialize;
use std::collections::BTreeSet;

use super::collector::{available_sim_well_time_steps, ensemble_rft_time_steps};
use crate::provider::TimeStepProvider;
use crate::source::{DataSourceKey, EnsembleHandle};
use crate::types::{ChannelFilter, Timestamp};

/// One curve to draw: a source, the well name it is queried with and a date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RftPltCurveDefinition {
    pub source: DataSourceKey,
    pub well_name: String,
    pub time_step: Timestamp,
}

impl RftPltCurveDefinition {
    pub fn new(source: DataSourceKey, well_name: impl Into<String>, time_step: Timestamp) -> Self {
        Self {
            source,
            well_name: well_name.into(),
            time_step,
        }
    }
}

fn insert_selected(
    defs: &mut BTreeSet<RftPltCurveDefinition>,
    selected: &BTreeSet<Timestamp>,
    source: &DataSourceKey,
    well_name: &str,
    available: impl IntoIterator<Item = Timestamp>,
) {
    for time_step in available {
        if selected.contains(&time_step) {
            defs.insert(RftPltCurveDefinition::new(source.clone(), well_name, time_step));
        }
    }
}

fn insert_ensemble_members<P>(
    defs: &mut BTreeSet<RftPltCurveDefinition>,
    provider: &P,
    selected: &BTreeSet<Timestamp>,
    source: &DataSourceKey,
    ensemble: &EnsembleHandle,
    well_name: &str,
) where
    P: TimeStepProvider + ?Sized,
{
    for member in &ensemble.members {
        let member_source = DataSourceKey::SummaryRft {
            summary_case: member.clone(),
            ensemble: Some(ensemble.clone()),
            grid_case: source.grid_case().cloned(),
        };
        let available = provider.summary_rft_time_steps(member, well_name);
        insert_selected(defs, selected, &member_source, well_name, available);
    }
}

/// Curve definitions for every selected source with data at a selected time.
///
/// Ensemble sources, and summary sources belonging to an ensemble, expand
/// into one definition per member summary case. An `EnsembleRft` source also
/// yields its own (statistics) definition.
pub fn curve_defs_from_time_steps<P>(
    provider: &P,
    well_name: &str,
    selected_time_steps: &BTreeSet<Timestamp>,
    first_sim_well_step_is_valid: bool,
    sources: &BTreeSet<DataSourceKey>,
    channels: &ChannelFilter,
) -> BTreeSet<RftPltCurveDefinition>
where
    P: TimeStepProvider + ?Sized,
{
    let mut defs = BTreeSet::new();
    let sim_well_name = provider.simulation_well_name(well_name);

    for source in sources {
        match source {
            DataSourceKey::None => {}
            DataSourceKey::SimWellRft { case } => {
                let available = provider.rft_time_steps(case, &sim_well_name, channels);
                insert_selected(&mut defs, selected_time_steps, source, &sim_well_name, available);
            }
            DataSourceKey::GridCellData { case } => {
                let available = available_sim_well_time_steps(
                    provider,
                    case,
                    &sim_well_name,
                    first_sim_well_step_is_valid,
                );
                insert_selected(&mut defs, selected_time_steps, source, &sim_well_name, available);
            }
            DataSourceKey::ObservedLasFile { file } => {
                let available = provider.las_file_date(file);
                insert_selected(&mut defs, selected_time_steps, source, &sim_well_name, available);
            }
            DataSourceKey::ObservedFmuRft { data } => {
                let available = provider.fmu_rft_time_steps(data, well_name);
                insert_selected(&mut defs, selected_time_steps, source, well_name, available);
            }
            DataSourceKey::ObservedPressureDepth { data } => {
                let available = provider.pressure_depth_time_steps(data, well_name);
                insert_selected(&mut defs, selected_time_steps, source, well_name, available);
            }
            DataSourceKey::EnsembleRft { ensemble } => {
                insert_ensemble_members(
                    &mut defs,
                    provider,
                    selected_time_steps,
                    source,
                    ensemble,
                    well_name,
                );
                let statistics = ensemble_rft_time_steps(provider, ensemble, well_name);
                insert_selected(&mut defs, selected_time_steps, source, well_name, statistics);
            }
            DataSourceKey::SummaryRft {
                ensemble: Some(ensemble),
                ..
            } => {
                insert_ensemble_members(
                    &mut defs,
                    provider,
                    selected_time_steps,
                    source,
                    ensemble,
                    well_name,
                );
            }
            DataSourceKey::SummaryRft { summary_case, .. } => {
                let available = provider.summary_rft_time_steps(summary_case, well_name);
                insert_selected(&mut defs, selected_time_steps, source, well_name, available);
            }
        }
    }

    defs
}
