mod common;

use std::time::Duration;

use trunkline_core::cause::CAUSE_NORMAL_CLEARING;
use trunkline_core::debug;
use trunkline_core::flags::CHAN_INUSE;
use trunkline_core::ChanState;
use trunkline_pdus::boost::{BoostEvent, BoostEventId};
use trunkline_signal::boost::SocketKind;
use trunkline_signal::sigmsg::SigEvent;

use common::TestBoost;

fn call_start(span: u8, chan: u8) -> BoostEvent {
    let mut event = BoostEvent::short(BoostEventId::CallStart, span, chan, 0, 0);
    event.calling_number_digits = "2125551000".to_string();
    event.called_number_digits = "5558000".to_string();
    event.calling_name = "ALICE".to_string();
    event.isup_in_rdnis = "5550001".to_string();
    event.calling_number_screening_ind = 1;
    event.calling_number_presentation = 0;
    event
}

#[test]
fn test_inbound_call_accept_and_remote_hangup() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    // Peer offers a call on physical slot 0:1
    tb.engine.process_event(SocketKind::Main, &call_start(0, 1));
    tb.engine.advance_states();

    let start = tb.recv_sig();
    assert_eq!(start.event, SigEvent::Start);
    assert_eq!(start.chan_id, 2);

    let chan = tb.engine.span().chan(2).unwrap().clone();
    assert_eq!(chan.state(), ChanState::Ring);
    assert!(chan.test_flag(CHAN_INUSE));
    {
        let call = chan.lock();
        assert_eq!(call.caller_data.cid_num.digits, "2125551000");
        assert_eq!(call.caller_data.cid_name, "ALICE");
        assert_eq!(call.caller_data.dnis.digits, "5558000");
        assert_eq!(call.caller_data.rdnis.digits, "5550001");
        assert_eq!(call.caller_data.screen, 1);
    }

    // Application indicates early media: the peer sees the setup ack
    tb.engine.request_state(&chan, ChanState::ProgressMedia).unwrap();
    tb.engine.advance_states();
    tb.peer.wait_for_main(BoostEventId::CallStartAck, Duration::from_secs(2));

    // Answer: only CALL_ANSWERED goes out, the ack was already sent
    tb.engine.request_state(&chan, ChanState::Up).unwrap();
    tb.engine.advance_states();
    let events = tb.peer.drain_main();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, Some(BoostEventId::CallAnswered));

    // Peer hangs up; we confirm and idle the channel
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStopped, 0, 1, 0, CAUSE_NORMAL_CLEARING),
    );
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Stop);
    tb.peer.wait_for_main(BoostEventId::CallStoppedAck, Duration::from_secs(2));
    assert_eq!(chan.state(), ChanState::Down);
    assert!(!chan.test_flag(CHAN_INUSE));
}

#[test]
fn test_inbound_immediate_answer_acks_first() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    tb.engine.process_event(SocketKind::Main, &call_start(0, 0));
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Start);

    // Answer straight from RING: the peer still gets the setup ack first
    let chan = tb.engine.span().chan(1).unwrap().clone();
    tb.engine.request_state(&chan, ChanState::Up).unwrap();
    tb.engine.advance_states();

    let events = tb.peer.drain_main();
    let ids: Vec<_> = events.iter().map(|e| e.event_id.unwrap()).collect();
    assert_eq!(ids, vec![BoostEventId::CallStartAck, BoostEventId::CallAnswered]);
}

#[test]
fn test_inbound_busy_slot_is_nacked() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    tb.engine.process_event(SocketKind::Main, &call_start(0, 2));
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Start);

    // A second offer for the same slot is refused on the wire
    tb.engine.process_event(SocketKind::Main, &call_start(0, 2));
    let nack = tb.peer.wait_for_main(BoostEventId::CallStartNack, Duration::from_secs(2));
    assert_eq!((nack.span, nack.chan), (0, 2));

    // The original call is untouched
    let chan = tb.engine.span().chan(3).unwrap();
    assert_eq!(chan.state(), ChanState::Ring);
}

#[test]
fn test_inbound_withdrawn_before_answer() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    tb.engine.process_event(SocketKind::Main, &call_start(0, 1));
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Start);
    let chan = tb.engine.span().chan(2).unwrap().clone();

    // Peer withdraws the offer with a no-setup-id nack
    tb.engine.process_event(
        SocketKind::Main,
        &BoostEvent::short(BoostEventId::CallStartNack, 0, 1, 0, CAUSE_NORMAL_CLEARING),
    );
    tb.engine.advance_states();

    assert_eq!(tb.recv_sig().event, SigEvent::Stop);
    tb.peer.wait_for_main(BoostEventId::CallStartNackAck, Duration::from_secs(2));
    assert_eq!(chan.state(), ChanState::Down);
    assert!(!chan.test_flag(CHAN_INUSE));
}

#[test]
fn test_incoming_digits_land_on_the_channel() {
    debug::setup_logging_verbose();
    let tb = TestBoost::new(4);
    tb.restart_handshake();

    tb.engine.process_event(SocketKind::Main, &call_start(0, 1));
    tb.engine.advance_states();
    assert_eq!(tb.recv_sig().event, SigEvent::Start);
    let chan = tb.engine.span().chan(2).unwrap().clone();

    let mut digits = BoostEvent::short(BoostEventId::DigitIn, 0, 1, 0, 0);
    digits.called_number_digits = "14#".to_string();
    tb.engine.process_event(SocketKind::Main, &digits);

    assert_eq!(chan.take_dtmf(), "14#");
    assert_eq!(chan.take_dtmf(), "");
}
