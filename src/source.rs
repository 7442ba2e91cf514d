//! Data Source Identity
//!
//! `DataSourceKey` identifies one source of RFT/PLT data for a well: an
//! observed LAS file, a simulation case's RFT results or grid cell data, a
//! summary case or ensemble with RFT data, or observed FMU / pressure-depth
//! data. Keys are immutable values used as members of ordered sets, so the
//! ordering below is a strict total order:
//!
//! 1. variant tag (declaration order)
//! 2. a variant-specific key: file and well name, case id, or display name
//!
//! Optional sub-handles (ensemble, grid case of a summary source) compare
//! with "absent sorts before present".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::types::UnitSystem;

// ============================================================================
// Handles
// ============================================================================

/// A simulation (grid) case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseHandle {
    /// Unique case id within the project
    pub case_id: i32,
    /// User-facing case description
    pub name: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
}

/// An observed LAS well-log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LasFileHandle {
    pub file_name: String,
    /// Well path the file is attached to
    #[serde(default)]
    pub well_name: String,
    /// Depth unit as recorded in the file header (e.g. "M", "FT")
    #[serde(default)]
    pub depth_unit: String,
}

/// A summary case that may carry RFT data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCaseHandle {
    pub name: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
}

/// A named group of summary cases (realizations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleHandle {
    pub name: String,
    #[serde(default)]
    pub members: Vec<SummaryCaseHandle>,
}

/// Observed FMU RFT data or pressure/depth data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedDataHandle {
    pub name: String,
}

// ============================================================================
// Source Category
// ============================================================================

/// Reconciliation bucket a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceCategory {
    Observed,
    SimulationRft,
    GridModel,
    SummaryRft,
    EnsembleRft,
}

impl SourceCategory {
    /// Short tag shown next to a time step in the selection list.
    pub fn tag(self) -> &'static str {
        match self {
            SourceCategory::Observed => "O",
            SourceCategory::SimulationRft | SourceCategory::SummaryRft => "R",
            SourceCategory::GridModel => "G",
            SourceCategory::EnsembleRft => "E",
        }
    }
}

// ============================================================================
// DataSourceKey
// ============================================================================

/// Identity of one RFT/PLT data source.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceKey {
    #[default]
    None,
    ObservedLasFile {
        file: LasFileHandle,
    },
    SimWellRft {
        case: CaseHandle,
    },
    GridCellData {
        case: CaseHandle,
    },
    SummaryRft {
        summary_case: SummaryCaseHandle,
        #[serde(default)]
        ensemble: Option<EnsembleHandle>,
        #[serde(default)]
        grid_case: Option<CaseHandle>,
    },
    EnsembleRft {
        ensemble: EnsembleHandle,
    },
    ObservedFmuRft {
        data: ObservedDataHandle,
    },
    ObservedPressureDepth {
        data: ObservedDataHandle,
    },
}

impl DataSourceKey {
    fn variant_index(&self) -> u8 {
        match self {
            DataSourceKey::None => 0,
            DataSourceKey::ObservedLasFile { .. } => 1,
            DataSourceKey::SimWellRft { .. } => 2,
            DataSourceKey::GridCellData { .. } => 3,
            DataSourceKey::SummaryRft { .. } => 4,
            DataSourceKey::EnsembleRft { .. } => 5,
            DataSourceKey::ObservedFmuRft { .. } => 6,
            DataSourceKey::ObservedPressureDepth { .. } => 7,
        }
    }

    /// Reconciliation bucket, or `None` for the empty key.
    pub fn category(&self) -> Option<SourceCategory> {
        match self {
            DataSourceKey::None => None,
            DataSourceKey::ObservedLasFile { .. }
            | DataSourceKey::ObservedFmuRft { .. }
            | DataSourceKey::ObservedPressureDepth { .. } => Some(SourceCategory::Observed),
            DataSourceKey::SimWellRft { .. } => Some(SourceCategory::SimulationRft),
            DataSourceKey::GridCellData { .. } => Some(SourceCategory::GridModel),
            DataSourceKey::SummaryRft { .. } => Some(SourceCategory::SummaryRft),
            DataSourceKey::EnsembleRft { .. } => Some(SourceCategory::EnsembleRft),
        }
    }

    /// Simulation case behind the source, if any.
    pub fn grid_case(&self) -> Option<&CaseHandle> {
        match self {
            DataSourceKey::SimWellRft { case } | DataSourceKey::GridCellData { case } => Some(case),
            DataSourceKey::SummaryRft { grid_case, .. } => grid_case.as_ref(),
            _ => None,
        }
    }

    pub fn ensemble(&self) -> Option<&EnsembleHandle> {
        match self {
            DataSourceKey::EnsembleRft { ensemble } => Some(ensemble),
            DataSourceKey::SummaryRft { ensemble, .. } => ensemble.as_ref(),
            _ => None,
        }
    }

    /// Short user-facing name used when labelling curves.
    pub fn display_name(&self) -> String {
        match self {
            DataSourceKey::None => String::new(),
            DataSourceKey::ObservedLasFile { file } => file.file_name.clone(),
            DataSourceKey::SimWellRft { case } => format!("{}, RFT", case.name),
            DataSourceKey::GridCellData { case } => case.name.clone(),
            DataSourceKey::SummaryRft { summary_case, .. } => summary_case.name.clone(),
            DataSourceKey::EnsembleRft { ensemble } => ensemble.name.clone(),
            DataSourceKey::ObservedFmuRft { data }
            | DataSourceKey::ObservedPressureDepth { data } => data.name.clone(),
        }
    }

    /// Distinct unit systems implied by the underlying case(s).
    ///
    /// An empty set means the unit system is unknown.
    pub fn available_unit_systems(&self) -> BTreeSet<UnitSystem> {
        let systems: Vec<UnitSystem> = match self {
            DataSourceKey::None
            | DataSourceKey::ObservedFmuRft { .. }
            | DataSourceKey::ObservedPressureDepth { .. } => Vec::new(),
            DataSourceKey::ObservedLasFile { file } => {
                vec![UnitSystem::from_depth_unit(&file.depth_unit)]
            }
            DataSourceKey::SimWellRft { case } | DataSourceKey::GridCellData { case } => {
                vec![case.unit_system]
            }
            DataSourceKey::SummaryRft {
                summary_case,
                grid_case,
                ..
            } => {
                let mut v = vec![summary_case.unit_system];
                if let Some(case) = grid_case {
                    v.push(case.unit_system);
                }
                v
            }
            DataSourceKey::EnsembleRft { ensemble } => {
                ensemble.members.iter().map(|m| m.unit_system).collect()
            }
        };
        systems.into_iter().filter(|s| s.is_known()).collect()
    }
}

fn cmp_optional<T, F>(a: Option<&T>, b: Option<&T>, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

impl Ord for DataSourceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_tag = self.variant_index().cmp(&other.variant_index());
        if by_tag != Ordering::Equal {
            return by_tag;
        }

        match (self, other) {
            (
                DataSourceKey::ObservedLasFile { file: a },
                DataSourceKey::ObservedLasFile { file: b },
            ) => a
                .file_name
                .cmp(&b.file_name)
                .then_with(|| a.well_name.cmp(&b.well_name)),
            (DataSourceKey::SimWellRft { case: a }, DataSourceKey::SimWellRft { case: b })
            | (
                DataSourceKey::GridCellData { case: a },
                DataSourceKey::GridCellData { case: b },
            ) => a.case_id.cmp(&b.case_id),
            (
                DataSourceKey::SummaryRft {
                    summary_case: sa,
                    ensemble: ea,
                    grid_case: ga,
                },
                DataSourceKey::SummaryRft {
                    summary_case: sb,
                    ensemble: eb,
                    grid_case: gb,
                },
            ) => sa
                .name
                .cmp(&sb.name)
                .then_with(|| cmp_optional(ea.as_ref(), eb.as_ref(), |x, y| x.name.cmp(&y.name)))
                .then_with(|| {
                    cmp_optional(ga.as_ref(), gb.as_ref(), |x, y| x.case_id.cmp(&y.case_id))
                }),
            (
                DataSourceKey::EnsembleRft { ensemble: a },
                DataSourceKey::EnsembleRft { ensemble: b },
            ) => a.name.cmp(&b.name),
            (DataSourceKey::ObservedFmuRft { data: a }, DataSourceKey::ObservedFmuRft { data: b })
            | (
                DataSourceKey::ObservedPressureDepth { data: a },
                DataSourceKey::ObservedPressureDepth { data: b },
            ) => a.name.cmp(&b.name),
            // Equal tags: only `None` is left.
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for DataSourceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DataSourceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DataSourceKey {}

impl std::fmt::Display for DataSourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceKey::None => write!(f, "None"),
            DataSourceKey::ObservedLasFile { file } => {
                write!(f, "Observed LAS: {}", file.file_name)
            }
            DataSourceKey::SimWellRft { case } => write!(f, "RFT: {}", case.name),
            DataSourceKey::GridCellData { case } => write!(f, "Grid: {}", case.name),
            DataSourceKey::SummaryRft { summary_case, .. } => {
                write!(f, "Summary RFT: {}", summary_case.name)
            }
            DataSourceKey::EnsembleRft { ensemble } => write!(f, "Ensemble RFT: {}", ensemble.name),
            DataSourceKey::ObservedFmuRft { data } => write!(f, "Observed FMU: {}", data.name),
            DataSourceKey::ObservedPressureDepth { data } => {
                write!(f, "Pressure/Depth: {}", data.name)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: i32, name: &str, units: UnitSystem) -> CaseHandle {
        CaseHandle {
            case_id: id,
            name: name.to_string(),
            unit_system: units,
        }
    }

    fn summary(name: &str) -> SummaryCaseHandle {
        SummaryCaseHandle {
            name: name.to_string(),
            unit_system: UnitSystem::Metric,
        }
    }

    fn sample_keys() -> Vec<DataSourceKey> {
        vec![
            DataSourceKey::GridCellData {
                case: case(2, "B", UnitSystem::Field),
            },
            DataSourceKey::SimWellRft {
                case: case(1, "A", UnitSystem::Metric),
            },
            DataSourceKey::None,
            DataSourceKey::SummaryRft {
                summary_case: summary("S1"),
                ensemble: Some(EnsembleHandle {
                    name: "E".into(),
                    members: vec![],
                }),
                grid_case: None,
            },
            DataSourceKey::SummaryRft {
                summary_case: summary("S1"),
                ensemble: None,
                grid_case: None,
            },
            DataSourceKey::ObservedLasFile {
                file: LasFileHandle {
                    file_name: "a.las".into(),
                    well_name: "A-1".into(),
                    depth_unit: "M".into(),
                },
            },
            DataSourceKey::ObservedPressureDepth {
                data: ObservedDataHandle { name: "pd".into() },
            },
            DataSourceKey::ObservedFmuRft {
                data: ObservedDataHandle { name: "fmu".into() },
            },
            DataSourceKey::EnsembleRft {
                ensemble: EnsembleHandle {
                    name: "E".into(),
                    members: vec![],
                },
            },
            DataSourceKey::SimWellRft {
                case: case(0, "Z", UnitSystem::Metric),
            },
        ]
    }

    #[test]
    fn test_order_is_by_tag_then_key() {
        let mut keys = sample_keys();
        keys.sort();
        let tags: Vec<u8> = keys.iter().map(DataSourceKey::variant_index).collect();
        assert_eq!(tags, vec![0, 1, 2, 2, 3, 4, 4, 5, 6, 7]);
        // Lower case id first within the same tag
        assert_eq!(keys[2].grid_case().map(|c| c.case_id), Some(0));
        // Absent ensemble sorts before present
        assert!(keys[5].ensemble().is_none());
        assert!(keys[6].ensemble().is_some());
    }

    #[test]
    fn test_order_is_total_and_antisymmetric() {
        let keys = sample_keys();
        for a in &keys {
            assert_eq!(a.cmp(a), Ordering::Equal);
            for b in &keys {
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &keys {
                    if a < b && b < c {
                        assert!(a < c, "transitivity violated: {a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let mut once = sample_keys();
        once.sort();
        let mut twice = once.clone();
        twice.sort();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_case_id_is_equal_in_set() {
        let set: BTreeSet<DataSourceKey> = [
            DataSourceKey::GridCellData {
                case: case(3, "X", UnitSystem::Metric),
            },
            DataSourceKey::GridCellData {
                case: case(3, "X renamed", UnitSystem::Metric),
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_las_file_name_on_two_wells_are_distinct() {
        let las = |well: &str| DataSourceKey::ObservedLasFile {
            file: LasFileHandle {
                file_name: "PLT.las".to_string(),
                well_name: well.to_string(),
                depth_unit: "M".to_string(),
            },
        };
        let set: BTreeSet<DataSourceKey> =
            [las("A-1"), las("B-2"), las("A-1")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(las("A-1") < las("B-2"));
    }

    #[test]
    fn test_available_unit_systems() {
        let grid = DataSourceKey::GridCellData {
            case: case(1, "A", UnitSystem::Field),
        };
        assert_eq!(
            grid.available_unit_systems().into_iter().collect::<Vec<_>>(),
            vec![UnitSystem::Field]
        );

        let las = DataSourceKey::ObservedLasFile {
            file: LasFileHandle {
                file_name: "x.las".into(),
                well_name: String::new(),
                depth_unit: "??".into(),
            },
        };
        assert!(las.available_unit_systems().is_empty());

        let fmu = DataSourceKey::ObservedFmuRft {
            data: ObservedDataHandle { name: "f".into() },
        };
        assert!(fmu.available_unit_systems().is_empty());
    }

    #[test]
    fn test_category_and_tags() {
        let keys = sample_keys();
        assert_eq!(keys[2].category(), None);
        assert_eq!(keys[0].category(), Some(SourceCategory::GridModel));
        assert_eq!(SourceCategory::SummaryRft.tag(), "R");
        assert_eq!(SourceCategory::EnsembleRft.tag(), "E");
    }

    #[test]
    fn test_serde_tagged_roundtrip() {
        let key = DataSourceKey::SimWellRft {
            case: case(7, "Base", UnitSystem::Metric),
        };
        let json = serde_json::to_string(&key).expect("serialize");
        assert!(json.contains("\"kind\":\"sim_well_rft\""));
        let back: DataSourceKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, key);
    }
}
