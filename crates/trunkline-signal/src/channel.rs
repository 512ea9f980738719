use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use trunkline_core::flags::{
    AtomicFlags, CHAN_ANSWERED, CHAN_INUSE, CHAN_MEDIA, CHAN_OPEN, CHAN_OUTBOUND, CHAN_PROGRESS,
    CHAN_STATE_CHANGE, SPAN_STATE_CHANGE,
};
use trunkline_core::{CallDirection, CallerData, ChanId, ChanState, ChanType, SetupId, SpanId};

use crate::state_map::StateMap;

/// A transition the state map refused. Callers branch on this exactly where
/// the teardown handlers need to emit the terminal response themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRefused {
    pub direction: CallDirection,
    pub from: ChanState,
    pub to: ChanState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanErr {
    AlreadyInUse,
}

/// Per-call state, guarded by the channel mutex. Zeroed when the channel
/// returns to DOWN.
#[derive(Debug, Default)]
pub struct CallState {
    pub state: ChanState,
    /// Deferred first state, applied when the call is started by the
    /// application rather than through the state map
    pub init_state: Option<ChanState>,
    /// Signaling-layer sub-flags (SFLAG_*)
    pub sflags: u32,
    /// Setup id that currently owns this channel, 0 when none
    pub extra_id: SetupId,
    pub caller_data: CallerData,
    /// Decoded DTMF digits queued for the application
    pub dtmf: VecDeque<char>,
    pub last_error: Option<String>,
}

/// One timeslot. Created at span configuration and outliving every call;
/// flag reads are atomic bit tests, everything per-call sits behind the
/// mutex.
#[derive(Debug)]
pub struct Channel {
    pub span_id: SpanId,
    pub chan_id: ChanId,
    pub physical_span_id: SpanId,
    pub physical_chan_id: ChanId,
    pub chan_type: ChanType,

    pub(crate) flags: AtomicFlags,
    call: Mutex<CallState>,
    state_map: &'static StateMap,
    span_flags: Arc<AtomicFlags>,
}

impl Channel {
    pub(crate) fn new(
        span_id: SpanId,
        chan_id: ChanId,
        chan_type: ChanType,
        state_map: &'static StateMap,
        span_flags: Arc<AtomicFlags>,
    ) -> Self {
        Self {
            span_id,
            chan_id,
            physical_span_id: span_id,
            physical_chan_id: chan_id,
            chan_type,
            flags: AtomicFlags::default(),
            call: Mutex::new(CallState::default()),
            state_map,
            span_flags,
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, CallState> {
        self.call.lock().expect("channel mutex blocked")
    }

    #[inline]
    pub fn test_flag(&self, bit: u32) -> bool {
        self.flags.test(bit)
    }

    /// Direction of the live call; channels without the OUTBOUND flag are
    /// treated as inbound
    pub fn direction(&self) -> CallDirection {
        if self.flags.test(CHAN_OUTBOUND) {
            CallDirection::Outbound
        } else {
            CallDirection::Inbound
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ChanState {
        self.lock().state
    }

    /// Attempts a state transition under the caller-held channel lock.
    /// Accepted transitions mark the channel and span for the advancer;
    /// refused ones leave the channel untouched.
    pub fn try_set_state(&self, call: &mut CallState, to: ChanState) -> Result<(), StateRefused> {
        let direction = self.direction();
        let from = call.state;

        if !self.state_map.is_allowed(direction, from, to) {
            tracing::debug!(
                "{}:{} refusing state change {} -> {} ({:?})",
                self.span_id,
                self.chan_id,
                from,
                to,
                direction
            );
            return Err(StateRefused { direction, from, to });
        }

        self.enter_state(call, to);
        Ok(())
    }

    /// Acquires the lock and attempts the transition
    pub fn set_state_locked(&self, to: ChanState) -> Result<(), StateRefused> {
        let mut call = self.lock();
        self.try_set_state(&mut call, to)
    }

    /// Applies the deferred initial state of an outbound call. This is the
    /// one entry into the machine that is not map-gated: the peer already
    /// acknowledged the call, the map only saw DOWN so far.
    pub(crate) fn apply_init_state(&self, call: &mut CallState) -> bool {
        let Some(init) = call.init_state.take() else {
            return false;
        };
        if call.state != ChanState::Down {
            return false;
        }
        self.enter_state(call, init);
        true
    }

    fn enter_state(&self, call: &mut CallState, to: ChanState) {
        tracing::debug!("{}:{} state change {} -> {}", self.span_id, self.chan_id, call.state, to);
        call.state = to;

        // Milestone flags consulted by the teardown and answer actions
        match to {
            ChanState::Progress => self.flags.set(CHAN_PROGRESS),
            ChanState::ProgressMedia => self.flags.set(CHAN_PROGRESS | CHAN_MEDIA),
            ChanState::Up => self.flags.set(CHAN_ANSWERED),
            _ => {}
        }

        self.flags.set(CHAN_STATE_CHANGE);
        self.span_flags.set(SPAN_STATE_CHANGE);
    }

    /// Claims the channel for a new call
    pub(crate) fn open(&self) -> Result<(), ChanErr> {
        if self.flags.test(CHAN_INUSE) {
            return Err(ChanErr::AlreadyInUse);
        }
        self.flags.set(CHAN_OPEN | CHAN_INUSE);
        Ok(())
    }

    /// Returns the channel to idle: per-call data is dropped and the call
    /// flags are cleared. State handling stays with the advancer.
    pub(crate) fn done(&self, call: &mut CallState) {
        tracing::debug!("{}:{} channel done", self.span_id, self.chan_id);
        call.caller_data = CallerData::default();
        call.dtmf.clear();
        call.init_state = None;
        call.last_error = None;
        self.flags.clear(CHAN_INUSE | CHAN_OUTBOUND | CHAN_OPEN | CHAN_PROGRESS | CHAN_MEDIA | CHAN_ANSWERED);
    }

    /// Appends decoded DTMF to the channel's digit queue
    pub fn queue_dtmf(&self, digits: &str) {
        let mut call = self.lock();
        call.dtmf.extend(digits.chars());
    }

    /// Drains the queued DTMF digits
    pub fn take_dtmf(&self) -> String {
        let mut call = self.lock();
        call.dtmf.drain(..).collect()
    }
}
