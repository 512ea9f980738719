//! Core types for the Trunkline signaling stack
//!
//! This crate provides the fundamental channel/span types shared by every
//! signaling dialect: call states, direction, flag bitsets, caller data and
//! release causes, plus the logging bootstrap.

/// Git version string, set at compile time
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Stack version followed by git version string, e.g., "0.3.2-aabbccdd"
pub const STACK_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);

pub mod call_direction;
pub mod caller_data;
pub mod cause;
pub mod chan_state;
pub mod debug;
pub mod flags;

// Re-export commonly used items
pub use call_direction::CallDirection;
pub use caller_data::CallerData;
pub use chan_state::ChanState;
pub use flags::AtomicFlags;

/// Logical span identifier, 1-based
pub type SpanId = u32;

/// Channel identifier within a span, 1-based
pub type ChanId = u32;

/// 16-bit call-setup correlator chosen by the initiator of an outbound call.
/// Zero is reserved and means "no setup id".
pub type SetupId = u16;

/// Trunk group index for hunting and congestion back-off accounting, 0-based
pub type TrunkGroup = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrunkType {
    E1,
    T1,
}

impl TrunkType {
    /// Number of timeslots carried by this trunk flavor
    pub fn slot_count(&self) -> u32 {
        match self {
            TrunkType::E1 => 32,
            TrunkType::T1 => 24,
        }
    }
}

/// Per-timeslot channel flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanType {
    /// Bearer timeslot carrying voice
    B,
    /// Signaling timeslot running Q.921 LAPD
    DQ921,
}
