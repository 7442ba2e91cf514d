//! Flow Accumulation Tests
//!
//! Pipe branch construction along a well path, accumulated phase flow and
//! PLT stacked curves over an in-memory project snapshot.

use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

use rft_plt_engine::config::FlowConfig;
use rft_plt_engine::flow::{
    build_pipe_branch, stacked_curves, AccumulatedWellFlow, CellIntersection, PltCurveOptions,
    PltWarning, TracerMode, WellResultPoint,
};
use rft_plt_engine::provider::{
    CellResultProvider, GridCaseRecord, IntersectionRecord, LasChannel, LasFileRecord, LasFlowLog,
    ProjectSnapshot, RftCellRates, RftRecord, SimWellFrameRecord, SimWellRecord, WellPathRecord,
};
use rft_plt_engine::source::{CaseHandle, DataSourceKey, LasFileHandle};
use rft_plt_engine::timeline::RftPltCurveDefinition;
use rft_plt_engine::types::{FlowCondition, FlowPhase, RftChannelType, Timestamp, UnitSystem};

// ============================================================================
// Fixtures
// ============================================================================

fn jan_2020() -> Timestamp {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().expect("valid date")
}

fn segment(cell: usize, top_md: f64) -> CellIntersection {
    CellIntersection {
        start_point: [0.0, 0.0, -top_md],
        end_point: [0.0, 0.0, -(top_md + 10.0)],
        start_md: top_md,
        end_md: top_md + 10.0,
        global_cell_index: cell,
    }
}

/// Three vertical cells, 10, 11 and 12, from MD 1000 to 1030.
fn trajectory() -> Vec<CellIntersection> {
    vec![segment(10, 1000.0), segment(11, 1010.0), segment(12, 1020.0)]
}

fn grid_point(cell: usize, oil: f64, water: f64, total: f64) -> WellResultPoint {
    let mut point = WellResultPoint::with_phase_rates(cell, oil, 0.0, water);
    point.flow_rate = Some(total);
    point
}

fn case(id: i32, name: &str, unit_system: UnitSystem) -> CaseHandle {
    CaseHandle {
        case_id: id,
        name: name.to_string(),
        unit_system,
    }
}

fn snapshot() -> ProjectSnapshot {
    ProjectSnapshot {
        well_paths: vec![WellPathRecord {
            name: "A-1".to_string(),
            sim_well_name: None,
            intersections: vec![
                IntersectionRecord {
                    case_id: 1,
                    segments: trajectory(),
                },
                IntersectionRecord {
                    case_id: 2,
                    segments: trajectory(),
                },
            ],
        }],
        grid_cases: vec![
            GridCaseRecord {
                case: case(1, "PRED", UnitSystem::Metric),
                report_dates: vec![jan_2020()],
                sim_wells: vec![SimWellRecord {
                    name: "A-1".to_string(),
                    frames: vec![SimWellFrameRecord {
                        report_step: 0,
                        branches: vec![vec![
                            grid_point(10, 10.0, 5.0, 18.0),
                            grid_point(11, 20.0, 5.0, 28.0),
                            grid_point(12, 30.0, 5.0, 40.0),
                        ]],
                    }],
                }],
                rft: Vec::new(),
            },
            GridCaseRecord {
                case: case(2, "HIST", UnitSystem::Field),
                report_dates: Vec::new(),
                sim_wells: Vec::new(),
                rft: vec![RftRecord {
                    well_name: "A-1".to_string(),
                    date: jan_2020(),
                    channels: [RftChannelType::Orat, RftChannelType::Grat].into_iter().collect(),
                    cells: vec![
                        RftCellRates {
                            global_cell_index: 10,
                            oil: 100.0,
                            gas: 5800.0,
                            water: 0.0,
                        },
                        RftCellRates {
                            global_cell_index: 12,
                            oil: 50.0,
                            gas: 5800.0,
                            water: 0.0,
                        },
                    ],
                }],
            },
            GridCaseRecord {
                case: case(3, "NO-GEOMETRY", UnitSystem::Metric),
                report_dates: vec![jan_2020()],
                sim_wells: Vec::new(),
                rft: Vec::new(),
            },
        ],
        ..Default::default()
    }
}

fn defs(sources: &[DataSourceKey]) -> BTreeSet<RftPltCurveDefinition> {
    sources
        .iter()
        .map(|s| RftPltCurveDefinition::new(s.clone(), "A-1", jan_2020()))
        .collect()
}

struct Lookup(BTreeMap<usize, WellResultPoint>);

impl CellResultProvider for Lookup {
    fn flow_at_cell(
        &self,
        global_cell_index: usize,
        _time_step: Timestamp,
    ) -> Option<WellResultPoint> {
        self.0.get(&global_cell_index).copied()
    }
}

// ============================================================================
// Branch Gaps
// ============================================================================

#[test]
fn trailing_missing_cell_leaves_no_dangling_gap() {
    let cells = Lookup(
        [10, 11]
            .into_iter()
            .map(|c| (c, WellResultPoint::with_phase_rates(c, 1.0, 2.0, 3.0)))
            .collect(),
    );
    let branch = build_pipe_branch(&trajectory(), &cells, jan_2020());

    // Two matched cells plus one separator between them
    assert_eq!(branch.cell_point_count(), 2);
    assert_eq!(branch.result_points.len(), 3);
    assert!(branch.result_points.last().is_some_and(WellResultPoint::is_valid));
    assert_eq!(branch.coords.len(), branch.result_points.len() + 1);

    let acc = AccumulatedWellFlow::from_branch(branch, TracerMode::Phases, &FlowConfig::default());
    for curve in acc.pseudo_length_curves(0) {
        assert_eq!(curve.depths.len(), curve.accumulated_flow.len());
        assert!(curve.depths.iter().all(|d| d.is_finite()));
        assert!(curve.accumulated_flow.iter().all(|v| v.is_finite()));
    }
    let totals: BTreeMap<String, f64> = acc.total_well_flow_per_tracer().into_iter().collect();
    assert_eq!(totals.get("Oil"), Some(&2.0));
    assert_eq!(totals.get("Water"), Some(&6.0));
}

#[test]
fn phase_tracers_sorted_by_total_flow() {
    let cells = Lookup(
        [10, 11, 12]
            .into_iter()
            .map(|c| (c, WellResultPoint::with_phase_rates(c, 1.0, 0.5, 4.0)))
            .collect(),
    );
    let branch = build_pipe_branch(&trajectory(), &cells, jan_2020());
    let acc = AccumulatedWellFlow::from_branch(branch, TracerMode::Phases, &FlowConfig::default());
    assert_eq!(acc.tracer_names(), ["Water", "Oil", "Gas"]);

    let fractions: f64 = acc.total_tracer_fractions().iter().map(|(_, f)| f).sum();
    assert!((fractions - 1.0).abs() < 1e-12);
}

// ============================================================================
// Stacked Curves
// ============================================================================

#[test]
fn grid_source_phase_curves() {
    let grid = DataSourceKey::GridCellData {
        case: case(1, "PRED", UnitSystem::Metric),
    };
    let set = stacked_curves(&snapshot(), "A-1", &defs(&[grid]), &PltCurveOptions::default());

    assert!(set.warnings.is_empty(), "unexpected warnings: {:?}", set.warnings);
    assert!(set.axis_title.contains("Sm3/day"));
    assert_eq!(set.curves.len(), 3);

    let oil = set
        .curves
        .iter()
        .find(|c| c.phase == FlowPhase::Oil)
        .expect("oil curve");
    assert_eq!(oil.name, "PRED, 01.Jan 2020, Oil [Sm3/day]");
    assert_eq!(oil.values.last(), Some(&60.0));
    assert_eq!(oil.depths.len(), oil.values.len());
    assert!(set.curves.iter().all(|c| c.group_id == oil.group_id));
    assert!(set.curves.iter().all(|c| c.fill));
}

#[test]
fn grid_source_total_curve_at_reservoir_condition() {
    let grid = DataSourceKey::GridCellData {
        case: case(1, "PRED", UnitSystem::Metric),
    };
    let options = PltCurveOptions {
        phases: [FlowPhase::Total].into_iter().collect(),
        use_standard_condition: false,
        use_reservoir_condition: true,
        ..Default::default()
    };
    let set = stacked_curves(&snapshot(), "A-1", &defs(&[grid]), &options);

    assert_eq!(set.curves.len(), 1);
    let total = &set.curves[0];
    assert_eq!(total.phase, FlowPhase::Total);
    assert_eq!(total.values.last(), Some(&86.0));
    assert!(set.axis_title.starts_with("Reservoir Flow Rate"));
}

#[test]
fn rft_source_converts_field_gas() {
    let rft = DataSourceKey::SimWellRft {
        case: case(2, "HIST", UnitSystem::Field),
    };
    let options = PltCurveOptions {
        phases: [FlowPhase::Gas].into_iter().collect(),
        ..Default::default()
    };
    let set = stacked_curves(&snapshot(), "A-1", &defs(&[rft]), &options);

    assert_eq!(set.curves.len(), 1);
    let gas = &set.curves[0];
    assert_eq!(gas.phase, FlowPhase::Gas);
    assert!(gas.name.ends_with("Gas [BOE/day]"), "name was {}", gas.name);
    let top = gas.values.last().copied().unwrap_or_default();
    assert!((top - 2000.0).abs() < 1e-6);
}

#[test]
fn missing_geometry_warns_and_omits_curves() {
    let source = DataSourceKey::GridCellData {
        case: case(3, "NO-GEOMETRY", UnitSystem::Metric),
    };
    let set = stacked_curves(&snapshot(), "A-1", &defs(&[source]), &PltCurveOptions::default());

    assert!(set.curves.is_empty());
    assert_eq!(
        set.warnings,
        vec![PltWarning::MissingWellPathGeometry {
            well_name: "A-1".to_string(),
            source: "NO-GEOMETRY".to_string(),
        }]
    );
}

#[test]
fn mixed_unit_systems_are_reported() {
    let sources = [
        DataSourceKey::GridCellData {
            case: case(1, "PRED", UnitSystem::Metric),
        },
        DataSourceKey::SimWellRft {
            case: case(2, "HIST", UnitSystem::Field),
        },
    ];
    let set = stacked_curves(&snapshot(), "A-1", &defs(&sources), &PltCurveOptions::default());

    assert!(set
        .warnings
        .iter()
        .any(|w| matches!(w, PltWarning::InconsistentUnits(systems) if systems.len() == 2)));
    assert!(!set.curves.is_empty());
}

#[test]
fn rft_gas_uses_configured_conversion_factor() {
    let rft = DataSourceKey::SimWellRft {
        case: case(2, "HIST", UnitSystem::Field),
    };
    let options = PltCurveOptions {
        phases: [FlowPhase::Gas].into_iter().collect(),
        flow: FlowConfig {
            field_gas_to_oil_equivalent: 0.5,
            ..FlowConfig::default()
        },
        ..Default::default()
    };
    let set = stacked_curves(&snapshot(), "A-1", &defs(&[rft]), &options);

    let top = set.curves[0].values.last().copied().unwrap_or_default();
    assert!((top - 5800.0).abs() < 1e-6);
}

#[test]
fn only_first_curve_group_is_filled() {
    let sources = [
        DataSourceKey::GridCellData {
            case: case(1, "PRED", UnitSystem::Metric),
        },
        DataSourceKey::SimWellRft {
            case: case(2, "HIST", UnitSystem::Field),
        },
    ];
    let set = stacked_curves(&snapshot(), "A-1", &defs(&sources), &PltCurveOptions::default());

    let groups: BTreeSet<usize> = set.curves.iter().map(|c| c.group_id).collect();
    assert_eq!(groups.len(), 2);
    assert!(set.curves.iter().all(|c| c.fill == (c.group_id == 0)));
}

#[test]
fn observed_las_channels_sorted_by_first_value() {
    let file = LasFileHandle {
        file_name: "plt.las".to_string(),
        well_name: "A-1".to_string(),
        depth_unit: "M".to_string(),
    };
    let mut snapshot = snapshot();
    snapshot.las_files.push(LasFileRecord {
        file: file.clone(),
        date: Some(jan_2020()),
        flow_log: Some(LasFlowLog {
            depths: vec![1000.0, 1030.0],
            depth_unit: String::new(),
            flow_condition: FlowCondition::Standard,
            channels: vec![
                LasChannel {
                    name: "QOIL".to_string(),
                    values: vec![5.0, 3.0],
                },
                LasChannel {
                    name: "QWAT".to_string(),
                    values: vec![-10.0, 2.0],
                },
                LasChannel {
                    name: "QTOT".to_string(),
                    values: vec![15.0, 5.0],
                },
            ],
        }),
    });

    let source = DataSourceKey::ObservedLasFile { file };
    let set = stacked_curves(&snapshot, "A-1", &defs(&[source]), &PltCurveOptions::default());

    let phases: Vec<FlowPhase> = set.curves.iter().map(|c| c.phase).collect();
    assert_eq!(phases, vec![FlowPhase::Water, FlowPhase::Oil]);
    assert!(set.curves.iter().all(|c| c.fill));
    assert_eq!(set.curves[0].values, vec![-10.0, 2.0]);
}
