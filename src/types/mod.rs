//! Shared value types for the RFT/PLT engine
//!
//! - `Timestamp`: UTC instant used as the time-step key everywhere
//! - Units: unit systems, flow phases/conditions, unit texts, gas conversion
//! - Channels: RFT channel types and well-log channel name classification

mod units;
pub mod channels;

pub use channels::{ChannelFilter, RftChannelType};
pub use units::*;

/// A single time step. Always UTC, so instants from different providers
/// compare exactly.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
