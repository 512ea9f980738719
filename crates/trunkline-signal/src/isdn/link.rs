use std::time::Duration;

use trunkline_pdus::q931::Q931Message;

/// Outcome of waiting on the D-channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// A frame is readable
    Ready,
    /// Nothing arrived within the timeout
    Timeout,
    /// The hardware layer reported an error
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkErr {
    Io(String),
    NotEstablished,
}

impl core::fmt::Display for LinkErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkErr::Io(e) => write!(f, "link i/o error: {}", e),
            LinkErr::NotEstablished => write!(f, "data link not established"),
        }
    }
}

/// Byte transport over the D-channel timeslot. Implemented by the hardware
/// I/O driver, outside this crate.
pub trait DchanIo: Send + Sync {
    /// Blocks up to `timeout` for the D-channel to become readable
    fn wait_read(&self, timeout: Duration) -> WaitStatus;

    /// Reads one HDLC frame
    fn read(&self, buf: &mut [u8]) -> Result<usize, LinkErr>;
}

/// The Q.921/Q.931 protocol stack boundary.
///
/// The stack owns framing, retransmission, and the byte-level Q.931 codec;
/// this engine only exchanges decoded [`Q931Message`]s with it. The stack is
/// expected to acknowledge RESTART and CONNECT on its own when configured to
/// (see `IsdnCfg::auto_restart_ack` / `auto_connect_ack`).
pub trait Q921Link: Send {
    /// Brings up the data link (SABME towards the peer for the user side)
    fn start(&mut self);

    /// Drives the Q.921 retransmission timers, called on every pump tick
    fn tick(&mut self);

    /// Feeds one received HDLC frame; returns the Q.931 messages it
    /// completed, possibly none
    fn rx_frame(&mut self, frame: &[u8]) -> Vec<Q931Message>;

    /// Encodes and transmits one Q.931 message down the D-channel
    fn tx_message(&mut self, msg: &Q931Message) -> Result<(), LinkErr>;
}
