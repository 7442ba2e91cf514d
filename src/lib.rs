//! RFT/PLT Engine: time-step reconciliation and accumulated well flow
//!
//! Decides which time steps a user may pick on an RFT (pressure) or PLT
//! (flow) plot for a well, given several data sources with differing
//! calendars, and computes the cumulative phase flow drawn on PLT plots.
//!
//! ## Architecture
//!
//! - **Providers**: read-only traits over case data, with a JSON
//!   `ProjectSnapshot` implementation
//! - **Timeline**: collect, reconcile and label time steps, expand selections
//!   into curve definitions
//! - **Flow**: pipe branches along the well path, accumulated flow per
//!   tracer, PLT stacked curves
//! - **Config**: TOML-tunable label formats, gas factors and channel names

pub mod config;
pub mod flow;
pub mod provider;
pub mod source;
pub mod timeline;
pub mod types;

// Re-export engine configuration
pub use config::EngineConfig;

// Re-export commonly used types
pub use source::{DataSourceKey, SourceCategory};
pub use types::{ChannelFilter, FlowCondition, FlowPhase, RftChannelType, Timestamp, UnitSystem};

// Re-export providers
pub use provider::{
    CellResultProvider, FlowDataProvider, ProjectSnapshot, SnapshotError, TimeStepProvider,
    WellPathGeometryProvider,
};

// Re-export the two engines
pub use flow::{stacked_curves, AccumulatedWellFlow, PltCurveOptions, PltCurveSet, TracerMode};
pub use timeline::{
    relevant_time_steps, time_step_options, ReconciledTimeline, RftPltCurveDefinition,
};
