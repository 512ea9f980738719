use std::sync::{Arc, Mutex};

use trunkline_core::flags::{AtomicFlags, CHAN_INUSE, SPAN_SUSPENDED};
use trunkline_core::{ChanId, ChanState, ChanType, SpanId, TrunkType};

use crate::channel::Channel;
use crate::sigmsg::{SigEvent, SigMsg, SigRefused, SignalCallback};
use crate::state_map::{DEFAULT_STATE_MAP, StateMap};

/// A logical bundle of timeslots on a trunk, with the per-channel records
/// and the upstream signal callback. The signaling dialect attaches on top.
pub struct Span {
    pub span_id: SpanId,
    pub trunk_type: TrunkType,
    channels: Vec<Arc<Channel>>,
    pub(crate) flags: Arc<AtomicFlags>,
    state_map: &'static StateMap,
    signal_cb: SignalCallback,
    pub last_error: Mutex<Option<String>>,
}

impl Span {
    /// Builds the channel table, one record per entry in `chan_types`,
    /// channel ids counting from 1.
    pub fn new(span_id: SpanId, trunk_type: TrunkType, chan_types: &[ChanType], signal_cb: SignalCallback) -> Arc<Self> {
        Self::with_state_map(span_id, trunk_type, chan_types, signal_cb, &DEFAULT_STATE_MAP)
    }

    pub fn with_state_map(
        span_id: SpanId,
        trunk_type: TrunkType,
        chan_types: &[ChanType],
        signal_cb: SignalCallback,
        state_map: &'static StateMap,
    ) -> Arc<Self> {
        let flags = Arc::new(AtomicFlags::default());
        let channels = chan_types
            .iter()
            .enumerate()
            .map(|(i, ct)| Arc::new(Channel::new(span_id, i as ChanId + 1, *ct, state_map, flags.clone())))
            .collect();

        Arc::new(Self {
            span_id,
            trunk_type,
            channels,
            flags,
            state_map,
            signal_cb,
            last_error: Mutex::new(None),
        })
    }

    pub fn chan_count(&self) -> u32 {
        self.channels.len() as u32
    }

    /// Channel by 1-based id
    pub fn chan(&self, chan_id: ChanId) -> Option<&Arc<Channel>> {
        if chan_id == 0 {
            return None;
        }
        self.channels.get(chan_id as usize - 1)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Arc<Channel>> {
        self.channels.iter()
    }

    pub fn state_map(&self) -> &'static StateMap {
        self.state_map
    }

    /// Channels with a live call
    pub fn in_use_count(&self) -> u32 {
        self.channels.iter().filter(|c| c.test_flag(CHAN_INUSE)).count() as u32
    }

    pub fn all_chans_down(&self) -> bool {
        self.channels.iter().all(|c| c.state() == ChanState::Down)
    }

    pub fn suspended(&self) -> bool {
        self.flags.test(SPAN_SUSPENDED)
    }

    /// Finds the channel matching the peer's physical coordinates (1-based).
    /// Without `force`, the channel must be idle; a busy match is an error.
    pub fn find_chan(&self, physical_span: SpanId, physical_chan: ChanId, force: bool) -> Option<Arc<Channel>> {
        for chan in &self.channels {
            if chan.physical_span_id != physical_span || chan.physical_chan_id != physical_chan {
                continue;
            }
            if force || (chan.state() == ChanState::Down && !chan.test_flag(CHAN_INUSE)) {
                return Some(chan.clone());
            }
            tracing::error!(
                "Channel {}:{} ~ {}:{} is already in use.",
                chan.span_id,
                chan.chan_id,
                chan.physical_span_id,
                chan.physical_chan_id
            );
            return None;
        }
        None
    }

    /// Fires the upstream callback for a channel
    pub(crate) fn signal(&self, chan: &Channel, event: SigEvent) -> Result<(), SigRefused> {
        let msg = SigMsg {
            span_id: chan.span_id,
            chan_id: chan.chan_id,
            event,
        };
        tracing::debug!("-> {:?} for {}:{}", event, chan.span_id, chan.chan_id);
        (self.signal_cb)(&msg)
    }

    pub fn set_last_error(&self, err: &str) {
        *self.last_error.lock().expect("span last_error mutex blocked") = Some(err.to_string());
    }
}
