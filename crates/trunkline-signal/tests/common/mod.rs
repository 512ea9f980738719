//! Shared harness for the signaling integration tests: a fake boost peer on
//! real UDP sockets plus a collector callback for upstream signal events.
#![allow(dead_code)]

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, unbounded};
use trunkline_config::BoostCfg;
use trunkline_core::{CallerData, ChanType, TrunkType};
use trunkline_pdus::boost::{BoostCodec, BoostEvent, BoostEventId};
use trunkline_signal::boost::{BoostSpan, SocketKind};
use trunkline_signal::sigmsg::{SigMsg, SignalCallback};
use trunkline_signal::span::Span;

/// Callback that forwards every upstream event into a channel for later
/// inspection, accepting all of them
pub fn collector() -> (SignalCallback, Receiver<SigMsg>) {
    let (tx, rx) = unbounded();
    let cb: SignalCallback = Arc::new(move |msg: &SigMsg| {
        let _ = tx.send(*msg);
        Ok(())
    });
    (cb, rx)
}

/// Caller data with the fields the boost setup path reads
pub fn caller(cid: &str, ani: &str) -> CallerData {
    let mut data = CallerData::default();
    data.cid_num.digits = cid.to_string();
    data.cid_name = cid.to_string();
    data.ani.digits = ani.to_string();
    data
}

/// Binds a socket pair on consecutive ports, the layout both boost legs use
fn bind_consecutive() -> (UdpSocket, UdpSocket) {
    for _ in 0..64 {
        let first = UdpSocket::bind("127.0.0.1:0").expect("bind failed");
        let port = first.local_addr().unwrap().port();
        if port == u16::MAX {
            continue;
        }
        if let Ok(second) = UdpSocket::bind(("127.0.0.1", port + 1)) {
            return (first, second);
        }
    }
    panic!("no consecutive udp port pair available");
}

/// Reserves a consecutive port pair for the engine to bind itself
fn reserve_port_pair() -> u16 {
    let (first, second) = bind_consecutive();
    let port = first.local_addr().unwrap().port();
    drop(first);
    drop(second);
    port
}

/// The far end of both boost sockets
pub struct TestPeer {
    main: UdpSocket,
    priority: UdpSocket,
    codec: BoostCodec,
    engine_main: SocketAddr,
    engine_priority: SocketAddr,
}

impl TestPeer {
    fn recv_on(&self, socket: &UdpSocket, timeout: Duration) -> Option<BoostEvent> {
        socket.set_read_timeout(Some(timeout)).unwrap();
        let mut buf = [0u8; 65536];
        match socket.recv_from(&mut buf) {
            Ok((len, _)) => self.codec.decode(&buf[..len]).ok(),
            Err(_) => None,
        }
    }

    pub fn recv_main(&self, timeout: Duration) -> Option<BoostEvent> {
        self.recv_on(&self.main, timeout)
    }

    pub fn recv_priority(&self, timeout: Duration) -> Option<BoostEvent> {
        self.recv_on(&self.priority, timeout)
    }

    /// Receives from the main socket until the wanted event id shows up
    pub fn wait_for_main(&self, wanted: BoostEventId, timeout: Duration) -> BoostEvent {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(event) = self.recv_main(Duration::from_millis(100)) {
                if event.event_id == Some(wanted) {
                    return event;
                }
            }
        }
        panic!("peer did not observe {} within {:?}", wanted, timeout);
    }

    pub fn wait_for_priority(&self, wanted: BoostEventId, timeout: Duration) -> BoostEvent {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(event) = self.recv_priority(Duration::from_millis(100)) {
                if event.event_id == Some(wanted) {
                    return event;
                }
            }
        }
        panic!("peer did not observe {} within {:?}", wanted, timeout);
    }

    pub fn send_main(&self, event: &BoostEvent) {
        let payload = self.codec.encode(event);
        self.main.send_to(&payload, self.engine_main).unwrap();
    }

    pub fn send_priority(&self, event: &BoostEvent) {
        let payload = self.codec.encode(event);
        self.priority.send_to(&payload, self.engine_priority).unwrap();
    }

    /// Discards everything queued on both sockets
    pub fn drain(&self) {
        while self.recv_main(Duration::from_millis(50)).is_some() {}
        while self.recv_priority(Duration::from_millis(50)).is_some() {}
    }

    /// Collects main-socket events until the line goes quiet
    pub fn drain_main(&self) -> Vec<BoostEvent> {
        let mut events = vec![];
        while let Some(event) = self.recv_main(Duration::from_millis(100)) {
            events.push(event);
        }
        events
    }
}

/// One boost engine wired against a fake peer
pub struct TestBoost {
    pub engine: Arc<BoostSpan>,
    pub peer: TestPeer,
    pub sig_rx: Receiver<SigMsg>,
}

impl TestBoost {
    pub fn new(chan_count: usize) -> Self {
        Self::with_timeout(chan_count, 2000)
    }

    pub fn with_timeout(chan_count: usize, request_timeout_ms: u64) -> Self {
        let (peer_main, peer_priority) = bind_consecutive();
        let peer_port = peer_main.local_addr().unwrap().port();
        let engine_port = reserve_port_pair();

        let cfg = BoostCfg {
            local_ip: "127.0.0.1".to_string(),
            local_port: engine_port,
            remote_ip: "127.0.0.1".to_string(),
            remote_port: peer_port,
            request_timeout_ms,
        };

        let (cb, sig_rx) = collector();
        let chan_types = vec![ChanType::B; chan_count];
        let span = Span::new(1, TrunkType::T1, &chan_types, cb);
        let engine = BoostSpan::new(span, cfg).expect("boost engine setup failed");

        let peer = TestPeer {
            main: peer_main,
            priority: peer_priority,
            codec: BoostCodec,
            engine_main: engine.main_local_addr().unwrap(),
            engine_priority: engine.priority_local_addr().unwrap(),
        };

        Self { engine, peer, sig_rx }
    }

    /// Completes the peer-restart handshake so the span accepts calls
    pub fn restart_handshake(&self) {
        let restart = BoostEvent::short(BoostEventId::SystemRestart, 0, 0, 0, 0);
        self.engine.process_event(SocketKind::Priority, &restart);
        self.engine.advance_states();
        assert!(!self.engine.span().suspended(), "handshake should clear suspension");
        self.peer.drain();
    }

    /// Next upstream signal event, failing the test if none arrives
    pub fn recv_sig(&self) -> SigMsg {
        self.sig_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("expected an upstream signal event")
    }
}
