use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use trunkline_core::SetupId;
use trunkline_core::flags::AtomicFlags;
use trunkline_pdus::boost::{BoostCodec, BoostEvent, BoostEventId};

/// Which of the two sockets an event arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    /// Main control socket
    Main,
    /// Priority socket for heartbeats and restart, base port + 1
    Priority,
}

#[derive(Debug)]
pub enum ConnErr {
    Io(std::io::Error),
    Encode(String),
}

impl core::fmt::Display for ConnErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConnErr::Io(e) => write!(f, "socket error: {}", e),
            ConnErr::Encode(e) => write!(f, "encode error: {}", e),
        }
    }
}

/// One UDP leg towards the boost peer. Reading is non-blocking; the pump
/// supplies the tick cadence. Writes may happen from any handler context.
pub struct BoostConnection {
    socket: UdpSocket,
    remote: SocketAddr,
    codec: BoostCodec,
    /// Transmit sequence, restarted with the connection
    seq: AtomicU32,
    /// LINK_* flags
    pub flags: AtomicFlags,
    hb_elapsed_ms: AtomicU64,
}

impl BoostConnection {
    pub fn open(local: SocketAddr, remote: SocketAddr) -> Result<Self, ConnErr> {
        let socket = UdpSocket::bind(local).map_err(ConnErr::Io)?;
        socket.set_nonblocking(true).map_err(ConnErr::Io)?;
        tracing::debug!("boost socket {} <-> {}", socket.local_addr().map_err(ConnErr::Io)?, remote);
        Ok(Self {
            socket,
            remote,
            codec: BoostCodec,
            seq: AtomicU32::new(0),
            flags: AtomicFlags::default(),
            hb_elapsed_ms: AtomicU64::new(0),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Encodes and transmits one event, stamping the tx sequence
    pub fn write_event(&self, event: &BoostEvent) -> Result<(), ConnErr> {
        let mut event = event.clone();
        event.seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let payload = self.codec.encode(&event);
        self.socket.send_to(&payload, self.remote).map_err(ConnErr::Io)?;
        tracing::trace!("-> {} ({} bytes)", event.event_name(), payload.len());
        Ok(())
    }

    /// Transmits a correlation-header-only event, logging failures. Used
    /// for acks and recovery where there is nothing else to do on error.
    pub fn exec_command(&self, span: u8, chan: u8, setup_id: SetupId, event_id: BoostEventId, cause: u8) {
        let event = BoostEvent::short(event_id, span, chan, setup_id, cause);
        if let Err(e) = self.write_event(&event) {
            tracing::error!("Failed to tx {} on boost socket [{}]", event_id, e);
        }
    }

    /// Reads one datagram, if any. `Ok(None)` covers both "nothing queued"
    /// and undecodable datagrams, which are logged and skipped.
    pub fn read_event(&self) -> Result<Option<BoostEvent>, ConnErr> {
        let mut buf = [0u8; 65536];
        match self.socket.recv_from(&mut buf) {
            Ok((len, _from)) => match self.codec.decode(&buf[..len]) {
                Ok(event) => {
                    tracing::trace!("<- {} ({} bytes)", event.event_name(), len);
                    Ok(Some(event))
                }
                Err(e) => {
                    tracing::warn!("Dropping undecodable boost datagram: {}", e);
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(ConnErr::Io(e)),
        }
    }

    pub fn hb_elapsed_ms(&self) -> u64 {
        self.hb_elapsed_ms.load(Ordering::SeqCst)
    }

    pub fn add_hb_elapsed(&self, ms: u64) {
        self.hb_elapsed_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn reset_hb(&self) {
        self.hb_elapsed_ms.store(0, Ordering::SeqCst);
    }

    /// Restarts the tx sequence, used when the peer resynchronizes
    pub fn reset_seq(&self) {
        self.seq.store(0, Ordering::SeqCst);
    }
}
