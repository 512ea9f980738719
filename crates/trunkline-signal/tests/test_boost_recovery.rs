mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use trunkline_core::debug;
use trunkline_core::ChanState;
use trunkline_pdus::boost::{BoostEvent, BoostEventId};
use trunkline_signal::boost::{RequestErr, SocketKind};
use trunkline_signal::io::NullSpanIo;
use trunkline_signal::sigmsg::SigEvent;

use common::{TestBoost, caller};

fn call_start(span: u8, chan: u8) -> BoostEvent {
    let mut event = BoostEvent::short(BoostEventId::CallStart, span, chan, 0, 0);
    event.calling_number_digits = "1000".to_string();
    event.called_number_digits = "2000".to_string();
    event
}

#[test]
fn test_heartbeat_echo_on_priority_socket() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);
    tb.restart_handshake();

    let hb = BoostEvent::short(BoostEventId::Heartbeat, 0, 0, 0, 0);
    tb.engine.process_event(SocketKind::Priority, &hb);
    tb.peer.wait_for_priority(BoostEventId::Heartbeat, Duration::from_secs(2));
}

#[test]
fn test_peer_restart_drops_all_calls_and_acks_once() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    // Bring three inbound calls up
    for slot in 0..3u8 {
        tb.engine.process_event(SocketKind::Main, &call_start(0, slot));
        tb.engine.advance_states();
        assert_eq!(tb.recv_sig().event, SigEvent::Start);
        let chan = tb.engine.span().chan(slot as u32 + 1).unwrap().clone();
        tb.engine.request_state(&chan, ChanState::Up).unwrap();
        tb.engine.advance_states();
        assert_eq!(chan.state(), ChanState::Up);
    }
    tb.peer.drain();

    // Peer restarts
    tb.engine.process_event(
        SocketKind::Priority,
        &BoostEvent::short(BoostEventId::SystemRestart, 0, 0, 0, 0),
    );
    assert!(tb.engine.restarting());
    assert!(tb.engine.span().suspended());

    tb.engine.advance_states();

    // Every channel fell back to idle and the application heard about it
    assert!(tb.engine.span().all_chans_down());
    let mut restarts = 0;
    while let Ok(msg) = tb.sig_rx.recv_timeout(Duration::from_millis(200)) {
        if msg.event == SigEvent::Restart {
            restarts += 1;
        }
    }
    assert_eq!(restarts, 3);

    // Exactly one restart ack went out, and the span is open again
    tb.peer.wait_for_main(BoostEventId::SystemRestartAck, Duration::from_secs(2));
    let extra_acks = tb
        .peer
        .drain_main()
        .iter()
        .filter(|e| e.event_id == Some(BoostEventId::SystemRestartAck))
        .count();
    assert_eq!(extra_acks, 0);
    assert!(!tb.engine.restarting());
    assert!(!tb.engine.span().suspended());

    // The outbound request table was re-zeroed
    for id in 1..10 {
        assert!(!tb.engine.request_in_use(id));
    }
    assert!(tb.engine.setup_grid_consistent());
}

#[test]
fn test_stale_ack_after_local_timeout() {
    debug::setup_logging_verbose();
    // Short sanity deadline so the timeout path runs in test time
    let tb = TestBoost::with_timeout(4, 250);
    tb.restart_handshake();

    // No answer from the peer: the request times out and nacks itself
    let started = Instant::now();
    let err = tb.engine.channel_request(&caller("100", "200")).unwrap_err();
    assert_eq!(err, RequestErr::RequestTimeout);
    assert!(started.elapsed() >= Duration::from_millis(250));

    let setup = tb.peer.wait_for_main(BoostEventId::CallStart, Duration::from_secs(2));
    let id = setup.call_setup_id;
    let nack = tb.peer.wait_for_main(BoostEventId::CallStartNack, Duration::from_secs(2));
    assert_eq!(nack.call_setup_id, id);

    // The id stays reserved and marked nacked until the peer acks the nack
    assert!(tb.engine.request_in_use(id));
    assert!(tb.engine.request_nacked(id));

    // A late ack must not touch any channel
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartAck, 0, 2, id, 0),
    );
    let chan = tb.engine.span().chan(3).unwrap();
    assert_eq!(chan.state(), ChanState::Down);
    assert!(!chan.test_flag(trunkline_core::flags::CHAN_INUSE));

    // The nack ack finally releases the id and clears the nack mark
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartNackAck, 0, 0, id, 0),
    );
    assert!(!tb.engine.request_in_use(id));
    assert!(!tb.engine.request_nacked(id));
}

#[test]
fn test_pump_handshake_and_heartbeat_over_the_wire() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);

    let handles = tb.engine.start(Arc::new(NullSpanIo));

    // The pump announces our restart on the priority socket
    tb.peer
        .wait_for_priority(BoostEventId::SystemRestart, Duration::from_secs(2));

    // Peer answers with its own restart; the handshake clears suspension
    tb.peer
        .send_priority(&BoostEvent::short(BoostEventId::SystemRestart, 0, 0, 0, 0));
    let deadline = Instant::now() + Duration::from_secs(2);
    while tb.engine.span().suspended() {
        assert!(Instant::now() < deadline, "span should come online");
        std::thread::sleep(Duration::from_millis(10));
    }
    tb.peer.wait_for_main(BoostEventId::SystemRestartAck, Duration::from_secs(2));

    // Heartbeats are echoed with priority
    tb.peer
        .send_priority(&BoostEvent::short(BoostEventId::Heartbeat, 0, 0, 0, 0));
    tb.peer.wait_for_priority(BoostEventId::Heartbeat, Duration::from_secs(2));

    // Shutdown announces one final restart so the peer releases our side
    tb.engine.stop(handles);
    tb.peer
        .wait_for_priority(BoostEventId::SystemRestart, Duration::from_secs(2));
}
