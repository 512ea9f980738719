use trunkline_core::ChanState::*;
use trunkline_core::{CallDirection, ChanState};

/// Empty from-set, matching any current state
pub const ANY_STATE: &[ChanState] = &[];

/// One row of the transition relation: from any state in `from` (empty
/// meaning any), the states in `to` may be entered.
#[derive(Debug)]
pub struct StateMapEntry {
    pub direction: CallDirection,
    pub from: &'static [ChanState],
    pub to: &'static [ChanState],
}

/// Immutable, declarative transition relation. Every state change on a
/// channel is gated through [`StateMap::is_allowed`]; there is no other way
/// to move a channel between states.
#[derive(Debug)]
pub struct StateMap {
    entries: &'static [StateMapEntry],
}

impl StateMap {
    pub const fn new(entries: &'static [StateMapEntry]) -> Self {
        Self { entries }
    }

    pub fn is_allowed(&self, direction: CallDirection, from: ChanState, to: ChanState) -> bool {
        self.entries.iter().any(|e| {
            e.direction == direction && (e.from.is_empty() || e.from.contains(&from)) && e.to.contains(&to)
        })
    }
}

/// The transition relation shared by both signaling dialects.
pub static DEFAULT_STATE_MAP: StateMap = StateMap::new(&[
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: ANY_STATE,
        to: &[Restart],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Restart],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Down],
        to: &[Dialing, ProgressMedia, Progress],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Dialing],
        to: &[Progress, ProgressMedia, Up, Hangup, Terminating],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[ProgressMedia, Progress],
        to: &[Hangup, Terminating, Up],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Hangup, Terminating],
        to: &[HangupComplete],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Hangup],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[HangupComplete],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Outbound,
        from: &[Up],
        to: &[Hangup, Terminating],
    },
    /****************************************/
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: ANY_STATE,
        to: &[Restart],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Restart],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Down],
        to: &[Ring],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Ring],
        to: &[Hangup, Cancel, Progress, ProgressMedia, Up],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Hangup, Terminating],
        to: &[HangupComplete],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Hangup],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Cancel, HangupComplete, Terminating],
        to: &[Down],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Progress, ProgressMedia],
        to: &[Hangup, Cancel, Terminating, Up],
    },
    StateMapEntry {
        direction: CallDirection::Inbound,
        from: &[Up],
        to: &[Hangup, Terminating],
    },
]);
