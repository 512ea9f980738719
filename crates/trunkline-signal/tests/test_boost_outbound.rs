mod common;

use std::thread;
use std::time::Duration;

use trunkline_core::cause::{CAUSE_ALL_CKTS_BUSY, CAUSE_NORMAL_CLEARING, CAUSE_USER_BUSY};
use trunkline_core::debug;
use trunkline_core::flags::{CHAN_INUSE, CHAN_OUTBOUND};
use trunkline_core::ChanState;
use trunkline_pdus::boost::{BoostEvent, BoostEventId, HuntPolicy};
use trunkline_signal::boost::{RequestErr, SocketKind};
use trunkline_signal::sigmsg::SigEvent;

use common::{TestBoost, caller};

#[test]
fn test_outbound_call_lifecycle() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    // Application requests an outbound call with a trunk-group selector
    let engine = tb.engine.clone();
    let requester = thread::spawn(move || engine.channel_request(&caller("5551000", "5551212@g1")));

    // The wire sees the setup: id 1, group 0, sequential ascending hunting
    let setup = tb.peer.wait_for_main(BoostEventId::CallStart, Duration::from_secs(2));
    assert_eq!(setup.call_setup_id, 1);
    assert_eq!(setup.trunk_group, 0);
    assert_eq!(setup.hunt_policy, HuntPolicy::SeqAsc);
    assert_eq!(setup.calling_number_digits, "5551000");
    assert_eq!(setup.called_number_digits, "5551212");

    // Peer acks, assigning physical slot 0:3
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartAck, 0, 3, 1, 0),
    );

    let chan = requester.join().unwrap().expect("channel request should succeed");
    assert_eq!(chan.chan_id, 4);
    assert!(chan.test_flag(CHAN_INUSE));
    assert!(chan.test_flag(CHAN_OUTBOUND));
    {
        let call = chan.lock();
        assert_eq!(call.extra_id, 1);
        assert_eq!(call.init_state, Some(ChanState::ProgressMedia));
    }
    assert!(tb.engine.request_in_use(1));
    assert!(tb.engine.setup_grid_consistent());

    // Starting the call surfaces early media upstream
    tb.engine.outgoing_call(&chan);
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::ProgressMedia);
    assert_eq!(chan.state(), ChanState::ProgressMedia);

    // Peer answers
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallAnswered, 0, 3, 1, 0),
    );
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Up);
    assert_eq!(chan.state(), ChanState::Up);

    // Local hangup with cause 16 reaches the peer
    tb.engine.hangup(&chan, CAUSE_NORMAL_CLEARING).unwrap();
    tb.engine.advance_states();
    let stopped = tb.peer.wait_for_main(BoostEventId::CallStopped, Duration::from_secs(2));
    assert_eq!(stopped.release_cause, CAUSE_NORMAL_CLEARING);
    assert_eq!((stopped.span, stopped.chan), (0, 3));

    // The teardown ack idles the channel and releases the setup id
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStoppedAck, 0, 3, 1, 0),
    );
    tb.engine.advance_states();
    assert_eq!(chan.state(), ChanState::Down);
    assert!(!chan.test_flag(CHAN_INUSE));
    assert_eq!(chan.lock().extra_id, 0);
    assert!(!tb.engine.request_in_use(1));
    assert!(tb.engine.setup_grid_consistent());
}

#[test]
fn test_answer_before_call_start_is_deferred() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);
    tb.restart_handshake();

    let engine = tb.engine.clone();
    let requester = thread::spawn(move || engine.channel_request(&caller("100", "200")));
    let setup = tb.peer.wait_for_main(BoostEventId::CallStart, Duration::from_secs(2));
    let id = setup.call_setup_id;

    // Ack and answer arrive back to back, before the requester starts the call
    tb.engine
        .process_event(SocketKind::Main, &BoostEvent::short(BoostEventId::CallStartAck, 0, 0, id, 0));
    tb.engine
        .process_event(SocketKind::Main, &BoostEvent::short(BoostEventId::CallAnswered, 0, 0, id, 0));

    let chan = requester.join().unwrap().expect("channel request should succeed");
    // The answer was stashed as the deferred initial state
    assert_eq!(chan.lock().init_state, Some(ChanState::Up));

    tb.engine.outgoing_call(&chan);
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Up);
    assert_eq!(chan.state(), ChanState::Up);
}

#[test]
fn test_request_fails_synchronously_while_congested() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);
    tb.restart_handshake();

    // Peer reports the trunk group full; back-off with 0 calls up is 1 s
    let mut nack = BoostEvent::short(BoostEventId::CallStartNack, 0, 0, 0, CAUSE_ALL_CKTS_BUSY);
    nack.trunk_group = 0;
    tb.engine.process_event(SocketKind::Main, &nack);
    assert!(tb.engine.trunk_group_congested(0));
    // Other trunk groups are unaffected
    assert!(!tb.engine.trunk_group_congested(1));

    // A request for the congested group fails without touching the wire
    tb.peer.drain();
    let err = tb.engine.channel_request(&caller("100", "200@g1")).unwrap_err();
    assert_eq!(err, RequestErr::CongestionBackoff);
    assert!(tb.peer.recv_main(Duration::from_millis(200)).is_none());

    // Once the back-off expires a fresh request goes out again
    thread::sleep(Duration::from_millis(1100));
    assert!(!tb.engine.trunk_group_congested(0));
    let engine = tb.engine.clone();
    let requester = thread::spawn(move || engine.channel_request(&caller("100", "200@g1")));
    let setup = tb.peer.wait_for_main(BoostEventId::CallStart, Duration::from_secs(2));
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartAck, 0, 1, setup.call_setup_id, 0),
    );
    assert!(requester.join().unwrap().is_ok());
}

#[test]
fn test_peer_nack_resolves_request_with_rewritten_cause() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);
    tb.restart_handshake();

    let engine = tb.engine.clone();
    let requester = thread::spawn(move || engine.channel_request(&caller("100", "200")));
    let setup = tb.peer.wait_for_main(BoostEventId::CallStart, Duration::from_secs(2));
    let id = setup.call_setup_id;

    // Peer nacks with the proprietary double-use cause; it surfaces as 17
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartNack, 0, 0, id, trunkline_core::cause::CAUSE_CSUPID_DBL_USE),
    );

    let err = requester.join().unwrap().unwrap_err();
    assert_eq!(err, RequestErr::PeerRejected { cause: CAUSE_USER_BUSY });

    // The nack was acked on the wire and the id is free again
    tb.peer.wait_for_main(BoostEventId::CallStartNackAck, Duration::from_secs(2));
    assert!(!tb.engine.request_in_use(id));

    // No channel was touched
    assert_eq!(tb.engine.span().in_use_count(), 0);
}

#[test]
fn test_request_refused_while_suspended() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(2);
    // No handshake: the span is still suspended
    let err = tb.engine.channel_request(&caller("100", "200")).unwrap_err();
    assert_eq!(err, RequestErr::SpanSuspended);
}
