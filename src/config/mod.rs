//! Engine Configuration Module
//!
//! Provides the reconciliation engine's tunable values loaded from TOML:
//! timeline label formats, gas unit conversion factors, branch folding and
//! the well-log channel name lists.
//!
//! ## Loading Order
//!
//! 1. `RFTPLT_CONFIG` environment variable (path to TOML file)
//! 2. `rft_plt.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let limit = config::get().flow.short_branch_point_limit;
//! ```
//!
//! Library code goes through `cfg_*` accessors that fall back to
//! [`defaults`] when `init()` was never called.

mod engine_config;
pub mod defaults;
pub mod validation;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global engine configuration.
///
/// Panics if `init()` has not been called. Use `is_initialized()` first on
/// paths that must work without a loaded config.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG
        .get()
        .expect("config::get() called before config::init(), this is a startup bug")
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}
