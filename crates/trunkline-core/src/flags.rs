use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free flag bitset. Mutation happens under the owning object's locks;
/// reads are plain atomic bit tests from any thread.
#[derive(Debug, Default)]
pub struct AtomicFlags(AtomicU32);

impl AtomicFlags {
    pub fn new(bits: u32) -> Self {
        Self(AtomicU32::new(bits))
    }

    #[inline]
    pub fn test(&self, bit: u32) -> bool {
        self.0.load(Ordering::SeqCst) & bit != 0
    }

    #[inline]
    pub fn set(&self, bit: u32) {
        self.0.fetch_or(bit, Ordering::SeqCst);
    }

    #[inline]
    pub fn clear(&self, bit: u32) {
        self.0.fetch_and(!bit, Ordering::SeqCst);
    }

    /// Clears the bit and reports whether it was set
    #[inline]
    pub fn take(&self, bit: u32) -> bool {
        self.0.fetch_and(!bit, Ordering::SeqCst) & bit != 0
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

// ── Channel flags ────────────────────────────────────────────────

/// A call is live on this channel
pub const CHAN_INUSE: u32 = 1 << 0;
/// The local application initiated the call
pub const CHAN_OUTBOUND: u32 = 1 << 1;
/// A state change is pending for the advancer
pub const CHAN_STATE_CHANGE: u32 = 1 << 2;
/// Call progress was indicated
pub const CHAN_PROGRESS: u32 = 1 << 3;
/// Early media was indicated
pub const CHAN_MEDIA: u32 = 1 << 4;
/// Call was answered
pub const CHAN_ANSWERED: u32 = 1 << 5;
/// Channel is open towards the hardware layer
pub const CHAN_OPEN: u32 = 1 << 6;

// ── Signaling-layer channel sub-flags (held under the call mutex) ─

/// Release the owning setup id when the channel reaches DOWN
pub const SFLAG_FREE_REQ_ID: u32 = 1 << 0;
/// The terminal STOPPED_ACK / START_NACK_ACK response was already emitted
pub const SFLAG_SENT_FINAL_RESPONSE: u32 = 1 << 1;

// ── Span flags ───────────────────────────────────────────────────

/// Span is not accepting calls (link down / peer restarting)
pub const SPAN_SUSPENDED: u32 = 1 << 0;
/// At least one channel has a pending state change
pub const SPAN_STATE_CHANGE: u32 = 1 << 1;

// ── Boost connection flags ───────────────────────────────────────

/// The peer has not completed its restart sequence yet
pub const LINK_DOWN: u32 = 1 << 0;
