use std::sync::Arc;

use trunkline_core::{ChanId, SpanId};

/// Signaling events delivered to the upstream application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigEvent {
    /// Inbound call offered; accept by driving the channel towards UP
    Start,
    /// Call torn down by the peer
    Stop,
    /// Outbound call answered
    Up,
    /// Outbound call proceeding
    Progress,
    /// Outbound call proceeding with early media
    ProgressMedia,
    /// Channel forced back to idle by a restart
    Restart,
}

#[derive(Debug, Clone, Copy)]
pub struct SigMsg {
    pub span_id: SpanId,
    pub chan_id: ChanId,
    pub event: SigEvent,
}

/// Returned by the application when it cannot take the call; the engine
/// responds by scheduling a hangup on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigRefused;

/// Upstream callback, registered at span configure time.
///
/// Invoked from the signaling thread with the channel lock held. The
/// callback must not reenter the span API on the same channel; hand the
/// event to another thread and return.
pub type SignalCallback = Arc<dyn Fn(&SigMsg) -> Result<(), SigRefused> + Send + Sync>;
