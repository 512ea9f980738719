use std::time::Duration;

use trunkline_core::ChanId;

/// Events surfaced by the hardware layer
#[derive(Debug, Clone)]
pub enum HwEvent {
    /// DTMF decoded on a bearer channel
    Dtmf { chan_id: ChanId, digits: String },
}

/// Hardware event source for a span. The actual I/O driver lives outside
/// this crate; the events thread polls it and feeds the channel table.
pub trait SpanIo: Send + Sync {
    /// Blocks up to `timeout` for the next hardware event
    fn poll_event(&self, timeout: Duration) -> Option<HwEvent>;
}

/// Event source for spans without hardware event support
pub struct NullSpanIo;

impl SpanIo for NullSpanIo {
    fn poll_event(&self, timeout: Duration) -> Option<HwEvent> {
        std::thread::sleep(timeout);
        None
    }
}
