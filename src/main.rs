//! rft-plt - RFT/PLT time-step reconciliation over a project snapshot
//!
//! Reads a JSON project snapshot (cases, LAS files, RFT readings, summary
//! and observed data plus the selected sources) and prints the selectable
//! time steps per well, or the stacked PLT curves for chosen dates.
//!
//! # Usage
//!
//! ```bash
//! # Time steps for every well in the snapshot
//! rft-plt timeline --snapshot project.json
//!
//! # Pressure-plot time steps for one well, as JSON
//! rft-plt timeline --snapshot project.json --well A-1 --plot rft --json
//!
//! # Stacked PLT curves for two dates
//! rft-plt curves --snapshot project.json --well A-1 \
//!     --time "01.Jan 2020" --time "01.Feb 2020 [O, G]"
//!
//! # Validate a config file
//! rft-plt check-config --path rft_plt.toml
//! ```
//!
//! # Environment Variables
//!
//! - `RFTPLT_CONFIG`: Path to the engine config TOML (default: ./rft_plt.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use rft_plt_engine::config::{self, EngineConfig};
use rft_plt_engine::flow::{stacked_curves, PltCurveOptions};
use rft_plt_engine::provider::ProjectSnapshot;
use rft_plt_engine::source::DataSourceKey;
use rft_plt_engine::timeline::{self, ReconciledTimeline};
use rft_plt_engine::types::{ChannelFilter, FlowPhase, RftChannelType};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rft-plt")]
#[command(about = "RFT/PLT time-step reconciliation and accumulated well flow")]
#[command(version)]
struct CliArgs {
    /// Engine config TOML, overrides the RFTPLT_CONFIG search order
    #[arg(long, global = true, env = "RFTPLT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print the selectable time steps for one well or every well
    Timeline {
        /// JSON project snapshot
        #[arg(long)]
        snapshot: PathBuf,
        /// Well name (default: every well in the snapshot)
        #[arg(long)]
        well: Option<String>,
        /// Plot kind, decides which RFT channels count as data
        #[arg(long, value_enum, default_value_t = PlotKind::Plt)]
        plot: PlotKind,
        /// Print JSON instead of labels
        #[arg(long)]
        json: bool,
    },

    /// Emit the stacked PLT curves for selected time steps as JSON
    Curves {
        /// JSON project snapshot
        #[arg(long)]
        snapshot: PathBuf,
        /// Well path name
        #[arg(long)]
        well: String,
        /// Selected time-step label, repeatable (default: every time step)
        #[arg(long = "time")]
        times: Vec<String>,
        /// Phases to draw
        #[arg(
            long,
            value_enum,
            value_delimiter = ',',
            default_values_t = [PhaseArg::Oil, PhaseArg::Gas, PhaseArg::Water]
        )]
        phases: Vec<PhaseArg>,
        /// Skip standard-condition phase curves
        #[arg(long)]
        no_standard: bool,
        /// Skip the reservoir-condition total curve
        #[arg(long)]
        no_reservoir: bool,
    },

    /// Load and validate an engine config file
    CheckConfig {
        /// Config file (default: the standard search order)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlotKind {
    Rft,
    Plt,
}

impl PlotKind {
    fn channels(self) -> ChannelFilter {
        match self {
            PlotKind::Rft => RftChannelType::rft_plot_channel_types(),
            PlotKind::Plt => RftChannelType::plt_plot_channel_types(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PhaseArg {
    Oil,
    Gas,
    Water,
    Total,
}

impl From<PhaseArg> for FlowPhase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Oil => FlowPhase::Oil,
            PhaseArg::Gas => FlowPhase::Gas,
            PhaseArg::Water => FlowPhase::Water,
            PhaseArg::Total => FlowPhase::Total,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_snapshot(path: &Path) -> Result<ProjectSnapshot> {
    let snapshot = ProjectSnapshot::load(path)
        .with_context(|| format!("Failed to load project snapshot {}", path.display()))?;
    if snapshot.selected_sources.is_empty() {
        warn!(path = %path.display(), "Snapshot selects no data sources, timelines will be empty");
    }
    Ok(snapshot)
}

fn selected_sources(snapshot: &ProjectSnapshot) -> BTreeSet<DataSourceKey> {
    snapshot
        .selected_sources
        .iter()
        .filter(|s| !matches!(s, DataSourceKey::None))
        .cloned()
        .collect()
}

/// A label typed on the command line has no tab, and may omit the tags.
fn label_matches(label: &str, typed: &str) -> bool {
    let typed = typed.trim();
    label.replace('\t', "") == typed || label.split(" \t[").next() == Some(typed)
}

fn print_timeline(well: &str, timeline: &ReconciledTimeline) {
    println!("{well}");
    if timeline.is_empty() {
        println!("  (no time steps)");
    }
    for option in timeline::time_step_options(timeline) {
        println!("  {}", option.label.replace('\t', ""));
    }
}

fn run_timeline(
    snapshot_path: &Path,
    well: Option<String>,
    plot: PlotKind,
    json: bool,
) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let sources = selected_sources(&snapshot);
    let channels = plot.channels();

    let wells: Vec<String> = match well {
        Some(w) => vec![w],
        None => snapshot.well_names().into_iter().collect(),
    };
    info!(wells = wells.len(), sources = sources.len(), "Reconciling time steps");

    let timelines = timeline::relevant_time_steps_for_wells(&snapshot, &wells, &sources, &channels);

    if json {
        let mut out = serde_json::Map::new();
        for (well, tl) in &timelines {
            let options = serde_json::to_value(timeline::time_step_options(tl))
                .context("Failed to serialize time-step options")?;
            out.insert(well.clone(), options);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (well, tl) in &timelines {
            print_timeline(well, tl);
        }
    }
    Ok(())
}

fn run_curves(
    snapshot_path: &Path,
    well: &str,
    times: &[String],
    options: PltCurveOptions,
) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let sources = selected_sources(&snapshot);
    let channels = RftChannelType::plt_plot_channel_types();

    let tl = timeline::relevant_time_steps(&snapshot, well, &sources, &channels);
    let time_options = timeline::time_step_options(&tl);

    let selected = if times.is_empty() {
        tl.time_steps().collect()
    } else {
        let labels: Vec<&str> = times
            .iter()
            .filter_map(|t| time_options.iter().find(|o| label_matches(&o.label, t)))
            .map(|o| o.label.as_str())
            .collect();
        let selected = timeline::resolve_selection(&time_options, &labels);
        if labels.len() != times.len() {
            let known: Vec<String> =
                time_options.iter().map(|o| o.label.replace('\t', "")).collect();
            bail!("Unknown time-step label(s) for well {well}; available: {known:?}");
        }
        selected
    };

    let curve_defs = timeline::curve_defs_from_time_steps(
        &snapshot,
        well,
        &selected,
        false,
        &sources,
        &channels,
    );
    info!(
        well = %well,
        time_steps = selected.len(),
        curves = curve_defs.len(),
        "Building PLT curves"
    );

    let set = stacked_curves(&snapshot, well, &curve_defs, &options);
    for w in &set.warnings {
        warn!("{}", w);
    }

    let out = serde_json::json!({
        "well": well,
        "axis_title": set.axis_title,
        "curves": set.curves,
        "warnings": set.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_check_config(path: Option<PathBuf>) -> Result<()> {
    let config = match path {
        Some(p) => EngineConfig::load_from_file(&p)
            .with_context(|| format!("Invalid config {}", p.display()))?,
        None => EngineConfig::load(),
    };
    print!("{}", config.to_toml()?);
    info!("✓ Config is valid");
    Ok(())
}

/// An explicit `--config` must load; otherwise fall back to the search order.
fn init_config(path: Option<&Path>) -> Result<EngineConfig> {
    let engine_config = match path {
        Some(p) => EngineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => EngineConfig::load(),
    };
    config::init(engine_config.clone());
    Ok(engine_config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    match args.command {
        SubCommand::CheckConfig { path } => run_check_config(path.or(args.config)),
        SubCommand::Timeline { snapshot, well, plot, json } => {
            init_config(args.config.as_deref())?;
            run_timeline(&snapshot, well, plot, json)
        }
        SubCommand::Curves {
            snapshot,
            well,
            times,
            phases,
            no_standard,
            no_reservoir,
        } => {
            let engine_config = init_config(args.config.as_deref())?;
            let options = PltCurveOptions {
                phases: phases.into_iter().map(FlowPhase::from).collect(),
                use_standard_condition: !no_standard,
                use_reservoir_condition: !no_reservoir,
                flow: engine_config.flow,
            };
            run_curves(&snapshot, &well, &times, options)
        }
    }
}
