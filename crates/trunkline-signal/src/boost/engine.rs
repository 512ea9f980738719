use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trunkline_config::BoostCfg;
use trunkline_core::assert_warn;
use trunkline_core::cause::{CAUSE_ALL_CKTS_BUSY, CAUSE_CSUPID_DBL_USE, CAUSE_DESTINATION_OUT_OF_ORDER, CAUSE_USER_BUSY};
use trunkline_core::flags::{
    AtomicFlags, CHAN_ANSWERED, CHAN_MEDIA, CHAN_OUTBOUND, CHAN_PROGRESS, CHAN_STATE_CHANGE, LINK_DOWN,
    SFLAG_FREE_REQ_ID, SFLAG_SENT_FINAL_RESPONSE, SPAN_STATE_CHANGE, SPAN_SUSPENDED,
};
use trunkline_core::{ChanState, SetupId, unimplemented_log};
use trunkline_pdus::boost::{BoostEvent, BoostEventId, parse_ani_suffix};

use crate::channel::{CallState, Channel};
use crate::sigmsg::SigEvent;
use crate::span::Span;

use super::arbiter::{MAX_REQ_ID, RequestArbiter, RequestStatus};
use super::congestion::{CongestionTable, MAX_TRUNK_GROUPS, congestion_delay};
use super::connection::{BoostConnection, SocketKind};

/// Engine flags
pub(crate) const BOOST_RUNNING: u32 = 1 << 0;
pub(crate) const BOOST_RESTARTING: u32 = 1 << 1;

/// Cascaded transitions settle within a handful of advancer passes; this
/// bound only guards against a cycling state map.
const ADVANCE_PASSES: usize = 8;

#[derive(Debug)]
pub enum BoostErr {
    BadAddress(String),
    Socket(String),
}

impl core::fmt::Display for BoostErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoostErr::BadAddress(e) => write!(f, "bad address: {}", e),
            BoostErr::Socket(e) => write!(f, "socket: {}", e),
        }
    }
}

/// Outcome of a failed outbound channel request. All of these are
/// synchronous: no channel was allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErr {
    /// Span is offline or mid-restart
    SpanSuspended,
    /// The requested trunk group is in congestion back-off
    CongestionBackoff,
    /// Every channel on the span carries a call
    AllCircuitsBusy,
    /// The arbiter has no free setup id
    NoFreeSetupId,
    /// The setup event could not be transmitted
    WriteFailed,
    /// The peer nacked the call with the given (normalized) cause
    PeerRejected { cause: u8 },
    /// No answer from the peer within the sanity deadline
    RequestTimeout,
}

impl core::fmt::Display for RequestErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RequestErr::SpanSuspended => write!(f, "span is not online"),
            RequestErr::CongestionBackoff => write!(f, "trunk group is backing off"),
            RequestErr::AllCircuitsBusy => write!(f, "all circuits are busy"),
            RequestErr::NoFreeSetupId => write!(f, "all setup ids are busy"),
            RequestErr::WriteFailed => write!(f, "failed to tx on boost socket"),
            RequestErr::PeerRejected { cause } => write!(f, "peer rejected the call (cause {})", cause),
            RequestErr::RequestTimeout => write!(f, "no response within the sanity deadline"),
        }
    }
}

/// SS7-boost signaling engine for one span.
///
/// Inbound events funnel through [`BoostSpan::process_event`] under the
/// signaling mutex; pending state changes are drained by
/// [`BoostSpan::advance_states`]. The pump threads drive both, the
/// application threads enter through `channel_request` and the state
/// request methods.
pub struct BoostSpan {
    span: Arc<Span>,
    pub(crate) mcon: BoostConnection,
    pub(crate) pcon: BoostConnection,
    pub(crate) arbiter: RequestArbiter,
    congestion: CongestionTable,
    /// Serializes all inbound event handlers
    signal_lock: Mutex<()>,
    pub(crate) flags: AtomicFlags,
    cfg: BoostCfg,
}

impl BoostSpan {
    /// Opens both sockets and attaches the engine to the span. The span
    /// starts out suspended until the restart handshake completes.
    pub fn new(span: Arc<Span>, cfg: BoostCfg) -> Result<Arc<Self>, BoostErr> {
        let parse = |ip: &str, port: u16| -> Result<SocketAddr, BoostErr> {
            format!("{}:{}", ip, port)
                .parse()
                .map_err(|e| BoostErr::BadAddress(format!("{}:{} ({})", ip, port, e)))
        };

        let mcon = BoostConnection::open(
            parse(&cfg.local_ip, cfg.local_port)?,
            parse(&cfg.remote_ip, cfg.remote_port)?,
        )
        .map_err(|e| BoostErr::Socket(e.to_string()))?;
        let pcon = BoostConnection::open(
            parse(&cfg.local_ip, cfg.local_port + 1)?,
            parse(&cfg.remote_ip, cfg.remote_port + 1)?,
        )
        .map_err(|e| BoostErr::Socket(e.to_string()))?;

        span.flags.set(SPAN_SUSPENDED);

        Ok(Arc::new(Self {
            span,
            mcon,
            pcon,
            arbiter: RequestArbiter::new(),
            congestion: CongestionTable::new(),
            signal_lock: Mutex::new(()),
            flags: AtomicFlags::default(),
            cfg,
        }))
    }

    pub fn span(&self) -> &Arc<Span> {
        &self.span
    }

    // ── Outbound entry points (application thread) ───────────────

    /// Requests a channel for an outgoing call and blocks until the peer
    /// acks, nacks, or the sanity deadline passes.
    pub fn channel_request(&self, caller_data: &trunkline_core::CallerData) -> Result<Arc<Channel>, RequestErr> {
        if self.span.suspended() {
            tracing::error!("SPAN is not online.");
            return Err(RequestErr::SpanSuspended);
        }

        let sel = parse_ani_suffix(&caller_data.ani.digits);
        let tg = if sel.trunk_group >= MAX_TRUNK_GROUPS {
            tracing::error!("Invalid trunk group number {}", sel.trunk_group + 1);
            0
        } else {
            sel.trunk_group
        };

        if self.congestion.check(tg) {
            tracing::error!("All circuits are busy. Trunk Group={} (peer requested back off)", tg + 1);
            return Err(RequestErr::CongestionBackoff);
        }

        if self.span.in_use_count() >= self.span.chan_count() {
            tracing::error!("All circuits are busy.");
            return Err(RequestErr::AllCircuitsBusy);
        }

        let Some(r) = self.arbiter.next_request_id() else {
            tracing::error!("All setup ids are busy.");
            return Err(RequestErr::NoFreeSetupId);
        };

        let mut event = BoostEvent::call_init(&caller_data.cid_num.digits, &sel.digits, r);
        event.trunk_group = tg as u8;
        event.hunt_policy = sel.hunt_policy;
        event.calling_name = caller_data.cid_name.clone();
        event.isup_in_rdnis = caller_data.rdnis.digits.clone();
        event.calling_number_screening_ind = caller_data.screen;
        event.calling_number_presentation = caller_data.pres;

        // Park before writing: the ack may race the write and may only
        // complete a slot that is already WAITING.
        self.arbiter.begin_waiting(r);

        let write_ok = match self.mcon.write_event(&event) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to tx on boost socket [{}]", e);
                false
            }
        };

        if write_ok {
            let _ = self.arbiter.wait(r, Duration::from_millis(self.cfg.request_timeout_ms));
        }

        let (status, chan, nack_event) = self.arbiter.finish(r);
        match (status, chan) {
            (RequestStatus::Ready, Some(chan)) => {
                let mut call = chan.lock();
                call.caller_data = caller_data.clone();
                // An answer racing our wake-up may already have stashed UP
                if call.init_state.is_none() {
                    call.init_state = Some(ChanState::ProgressMedia);
                }
                drop(call);
                Ok(chan)
            }
            (RequestStatus::Fail, _) => {
                self.arbiter.release(r);
                let cause = nack_event.map(|e| e.release_cause).unwrap_or(0);
                Err(RequestErr::PeerRejected { cause })
            }
            _ => {
                // Mark the id nacked and tell the peer, so a late ack cannot
                // leak channel state on either side.
                self.arbiter.set_nacked(r, true);
                self.mcon.exec_command(0, 0, r, BoostEventId::CallStartNack, 0);
                if write_ok {
                    Err(RequestErr::RequestTimeout)
                } else {
                    Err(RequestErr::WriteFailed)
                }
            }
        }
    }

    /// Starts the call on a channel handed out by `channel_request`,
    /// applying the deferred initial state.
    pub fn outgoing_call(&self, chan: &Arc<Channel>) {
        let mut call = chan.lock();
        chan.apply_init_state(&mut call);
    }

    /// Application-driven state transition (accept, progress, answer)
    pub fn request_state(&self, chan: &Arc<Channel>, to: ChanState) -> Result<(), crate::channel::StateRefused> {
        chan.set_state_locked(to)
    }

    /// Tears the call down with the given release cause
    pub fn hangup(&self, chan: &Arc<Channel>, cause: u8) -> Result<(), crate::channel::StateRefused> {
        let mut call = chan.lock();
        call.caller_data.hangup_cause = cause;
        chan.try_set_state(&mut call, ChanState::Hangup)
    }

    // ── Inbound event dispatch (signaling thread) ────────────────

    /// Decodes one peer event into channel/arbiter mutations. Handlers are
    /// serialized by the signaling mutex and never interleave.
    pub fn process_event(&self, from: SocketKind, event: &BoostEvent) {
        let _guard = self.signal_lock.lock().expect("signal mutex blocked");

        if event.call_setup_id as usize > MAX_REQ_ID {
            tracing::warn!("Dropping event {} with out-of-range setup id {}", event.event_name(), event.call_setup_id);
            return;
        }

        tracing::debug!("<- {} on {:?} socket", event.event_name(), from);

        match event.event_id {
            Some(BoostEventId::CallStart) => self.handle_call_start(event),
            Some(BoostEventId::CallStopped) => self.handle_call_stop(event),
            Some(BoostEventId::CallStartAck) => self.handle_call_start_ack(event),
            Some(BoostEventId::CallStartNack) => self.handle_call_start_nack(event),
            Some(BoostEventId::CallAnswered) => self.handle_call_answer(event),
            Some(BoostEventId::Heartbeat) => self.handle_heartbeat(event),
            Some(BoostEventId::CallStoppedAck) => self.handle_call_done(event),
            Some(BoostEventId::CallStartNackAck) => {
                self.handle_call_done(event);
                self.arbiter.set_nacked(event.call_setup_id, false);
            }
            Some(BoostEventId::SystemRestart) => self.handle_restart(),
            Some(BoostEventId::SystemRestartAck) => {
                tracing::debug!("RECV RESTART ACK");
            }
            Some(BoostEventId::DigitIn) => self.handle_incoming_digit(event),
            Some(BoostEventId::InsertCheckLoop)
            | Some(BoostEventId::RemoveCheckLoop)
            | Some(BoostEventId::AutoCallGapAbate) => {
                unimplemented_log!("{}", event.event_name());
            }
            None => {
                tracing::warn!("No handler implemented for unknown event");
            }
        }
    }

    /// Inbound call offered by the peer
    fn handle_call_start(&self, event: &BoostEvent) {
        let chan = self
            .span
            .find_chan(event.span as u32 + 1, event.chan as u32 + 1, false)
            .filter(|chan| chan.open().is_ok());

        let Some(chan) = chan else {
            tracing::error!("START CANT FIND A CHAN {}:{}", event.span + 1, event.chan + 1);
            self.mcon
                .exec_command(event.span, event.chan, 0, BoostEventId::CallStartNack, 0);
            return;
        };

        let mut call = chan.lock();
        call.sflags = 0;
        call.caller_data.cid_num.digits = event.calling_number_digits.clone();
        call.caller_data.cid_name = if event.calling_name.is_empty() {
            event.calling_number_digits.clone()
        } else {
            event.calling_name.clone()
        };
        call.caller_data.ani.digits = event.calling_number_digits.clone();
        call.caller_data.dnis.digits = event.called_number_digits.clone();
        if !event.isup_in_rdnis.is_empty() {
            call.caller_data.rdnis.digits = event.isup_in_rdnis.clone();
        }
        call.caller_data.screen = event.calling_number_screening_ind;
        call.caller_data.pres = event.calling_number_presentation;

        if chan.try_set_state(&mut call, ChanState::Ring).is_err() {
            drop(call);
            tracing::error!("START CANT RING CHAN {}:{}", event.span + 1, event.chan + 1);
            self.mcon
                .exec_command(event.span, event.chan, 0, BoostEventId::CallStartNack, 0);
        }
    }

    /// Peer acknowledged our outbound setup and assigned a slot
    fn handle_call_start_ack(&self, event: &BoostEvent) {
        let id = event.call_setup_id;
        if self.arbiter.is_nacked(id) {
            // Stale ack for a request we already abandoned
            return;
        }

        if id == 0 || !self.arbiter.id_in_use(id) {
            // Ack for a setup id we never allocated or already freed;
            // answer with a teardown so the peer releases the circuit
            tracing::error!("START ACK for unknown setup id {}", id);
            self.mcon.exec_command(
                event.span,
                event.chan,
                id,
                BoostEventId::CallStopped,
                CAUSE_DESTINATION_OUT_OF_ORDER,
            );
            return;
        }

        self.arbiter.bind_grid(event.span as usize, event.chan as usize, id);

        if let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, false) {
            match chan.open() {
                Ok(()) => {
                    chan.flags.set(CHAN_OUTBOUND);
                    let mut call = chan.lock();
                    call.extra_id = id;
                    call.sflags = 0;
                    drop(call);
                    tracing::debug!(
                        "Assign chan {}:{} ({}:{}) CSid={}",
                        chan.span_id,
                        chan.chan_id,
                        event.span + 1,
                        event.chan + 1,
                        id
                    );
                    self.arbiter.resolve_ready(id, chan, event.clone());
                    return;
                }
                Err(e) => {
                    let mut call = chan.lock();
                    call.last_error = Some(format!("{:?}", e));
                    tracing::error!("OPEN ERROR [{}]", call.last_error.as_deref().unwrap_or(""));
                }
            }
        }

        tracing::error!("START ACK CANT FIND A CHAN {}:{}", event.span + 1, event.chan + 1);
        self.mcon.exec_command(
            event.span,
            event.chan,
            id,
            BoostEventId::CallStopped,
            CAUSE_DESTINATION_OUT_OF_ORDER,
        );
        self.arbiter.resolve_fail(id, None);
    }

    /// Peer refused our outbound setup, or withdrew an offered call
    fn handle_call_start_nack(&self, event: &BoostEvent) {
        let mut cause = event.release_cause;

        if cause == CAUSE_ALL_CKTS_BUSY {
            let count = self.span.in_use_count();
            let delay = congestion_delay(count);
            let tg = if (event.trunk_group as usize) < MAX_TRUNK_GROUPS {
                event.trunk_group as usize
            } else {
                tracing::error!("Invalid All Ckt Busy trunk group number {}", event.trunk_group);
                0
            };
            self.congestion.backoff(tg, delay);
            cause = CAUSE_USER_BUSY;
        } else if cause == CAUSE_CSUPID_DBL_USE {
            cause = CAUSE_USER_BUSY;
        }

        if event.call_setup_id != 0 {
            self.mcon
                .exec_command(0, 0, event.call_setup_id, BoostEventId::CallStartNackAck, 0);
            let mut snapshot = event.clone();
            snapshot.release_cause = cause;
            self.arbiter.resolve_fail(event.call_setup_id, Some(snapshot));
            return;
        }

        // No setup id: the nack targets an inbound call we offered upstream
        if let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, true) {
            assert_warn!(
                !chan.test_flag(CHAN_OUTBOUND),
                "NACK without setup id for outbound channel {}:{}",
                chan.span_id,
                chan.chan_id
            );

            let mut call = chan.lock();
            if chan.try_set_state(&mut call, ChanState::Cancel).is_ok() {
                call.caller_data.hangup_cause = cause;
                return;
            }
            call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
        }

        // Nobody else will ack it, so we have to do it ourselves
        self.mcon
            .exec_command(event.span, event.chan, 0, BoostEventId::CallStartNackAck, 0);
    }

    /// Peer hung up
    fn handle_call_stop(&self, event: &BoostEvent) {
        if let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, true) {
            let mut call = chan.lock();
            if chan.try_set_state(&mut call, ChanState::Terminating).is_ok() {
                call.caller_data.hangup_cause = event.release_cause;
                call.sflags |= SFLAG_FREE_REQ_ID;
                return;
            }
            // Channel already past teardown; converge by acking directly
            call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
        }

        self.mcon
            .exec_command(event.span, event.chan, 0, BoostEventId::CallStoppedAck, 0);
        self.arbiter.release_span_chan(event.span as usize, event.chan as usize);
    }

    /// Terminal ack for a stopped or nacked call: release the setup id,
    /// unless the channel still has teardown to finish
    fn handle_call_done(&self, event: &BoostEvent) {
        if let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, true) {
            let mut call = chan.lock();
            let past_teardown = call.state == ChanState::Down || call.state == ChanState::HangupComplete;
            if !past_teardown && chan.try_set_state(&mut call, ChanState::HangupComplete).is_ok() {
                call.sflags |= SFLAG_FREE_REQ_ID;
                return;
            }
        }

        if event.call_setup_id != 0 {
            self.arbiter.release(event.call_setup_id);
        } else {
            self.arbiter.release_span_chan(event.span as usize, event.chan as usize);
        }
    }

    /// Peer answered our outbound call
    fn handle_call_answer(&self, event: &BoostEvent) {
        let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, true) else {
            tracing::error!("ANSWER CANT FIND A CHAN {}:{}", event.span + 1, event.chan + 1);
            return;
        };

        let mut call = chan.lock();
        if call.extra_id != event.call_setup_id || !chan.test_flag(CHAN_OUTBOUND) {
            tracing::debug!(
                "Ignoring ANSWER for {}:{} CSid={} (owner CSid={})",
                event.span + 1,
                event.chan + 1,
                event.call_setup_id,
                call.extra_id
            );
            return;
        }

        if call.state == ChanState::Down && call.init_state != Some(ChanState::Up) {
            // The requester has not started the call yet; answer on start
            call.init_state = Some(ChanState::Up);
        } else {
            let _ = chan.try_set_state(&mut call, ChanState::Up);
        }
    }

    /// Echo heartbeats on the priority socket
    fn handle_heartbeat(&self, event: &BoostEvent) {
        if let Err(e) = self.pcon.write_event(event) {
            tracing::error!("Failed to tx heartbeat on boost socket [{}]", e);
        }
        self.pcon.reset_hb();
    }

    /// Peer restarted: drop every call and suspend until all channels are down
    fn handle_restart(&self) {
        self.mcon.reset_seq();
        self.mcon.flags.set(LINK_DOWN);
        self.span.flags.set(SPAN_SUSPENDED);
        self.flags.set(BOOST_RESTARTING);
        self.pcon.reset_hb();
    }

    /// Hardware-decoded DTMF relayed by the peer
    fn handle_incoming_digit(&self, event: &BoostEvent) {
        let Some(chan) = self.span.find_chan(event.span as u32 + 1, event.chan as u32 + 1, true) else {
            tracing::error!("Invalid channel");
            return;
        };

        if event.called_number_digits.is_empty() {
            tracing::warn!(
                "Incoming digit event without digits [w{}g{}]",
                event.span + 1,
                event.chan + 1
            );
            return;
        }

        tracing::debug!(
            "Incoming digits {} [w{}g{}]",
            event.called_number_digits,
            event.span + 1,
            event.chan + 1
        );
        chan.queue_dtmf(&event.called_number_digits);
    }

    // ── State advancer (signaling thread) ────────────────────────

    /// Drains pending state changes until the span settles. Equivalent to
    /// running the per-tick check repeatedly.
    pub fn advance_states(&self) {
        for _ in 0..ADVANCE_PASSES {
            if !self.check_state_pass() {
                break;
            }
        }
    }

    fn check_state_pass(&self) -> bool {
        let mut advanced = false;

        // Suspension stops forcing restarts once every channel is down
        let mut susp = self.span.flags.test(SPAN_SUSPENDED);
        if susp && self.span.all_chans_down() {
            susp = false;
        }

        let pending = self.span.flags.take(SPAN_STATE_CHANGE);
        if pending || susp {
            for chan in self.span.channels() {
                let flagged = chan.flags.take(CHAN_STATE_CHANGE);
                if !flagged && !susp {
                    continue;
                }
                let mut call = chan.lock();
                if susp && call.state != ChanState::Down {
                    let _ = chan.try_set_state(&mut call, ChanState::Restart);
                }
                self.state_advance(chan, &mut call);
                advanced = true;
            }
        }

        if self.flags.test(BOOST_RESTARTING) && self.span.all_chans_down() {
            self.mcon.exec_command(0, 0, 0, BoostEventId::SystemRestartAck, 0);
            self.flags.clear(BOOST_RESTARTING);
            self.span.flags.clear(SPAN_SUSPENDED);
            self.mcon.flags.clear(LINK_DOWN);
            self.pcon.reset_hb();
            self.arbiter.reset();
            advanced = true;
        }

        advanced
    }

    /// Per-state action, entered with the channel lock held and the
    /// channel's pending flag already cleared
    fn state_advance(&self, chan: &Arc<Channel>, call: &mut CallState) {
        tracing::debug!("{}:{} STATE [{}]", chan.span_id, chan.chan_id, call.state);

        let pspan = chan.physical_span_id as u8 - 1;
        let pchan = chan.physical_chan_id as u8 - 1;

        match call.state {
            ChanState::Down => {
                call.extra_id = 0;
                if call.sflags & SFLAG_FREE_REQ_ID != 0 {
                    self.arbiter.release_span_chan(pspan as usize, pchan as usize);
                }
                call.sflags = 0;
                chan.done(call);
            }
            ChanState::ProgressMedia | ChanState::Progress => {
                if chan.test_flag(CHAN_OUTBOUND) {
                    if self.span.signal(chan, SigEvent::ProgressMedia).is_err() {
                        let _ = chan.try_set_state(call, ChanState::Hangup);
                    }
                } else {
                    self.mcon.exec_command(pspan, pchan, 0, BoostEventId::CallStartAck, 0);
                }
            }
            ChanState::Ring => {
                if !chan.test_flag(CHAN_OUTBOUND) && self.span.signal(chan, SigEvent::Start).is_err() {
                    let _ = chan.try_set_state(call, ChanState::Hangup);
                }
            }
            ChanState::Restart => {
                let _ = self.span.signal(chan, SigEvent::Restart);
                call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                let _ = chan.try_set_state(call, ChanState::Down);
            }
            ChanState::Up => {
                if chan.test_flag(CHAN_OUTBOUND) {
                    if self.span.signal(chan, SigEvent::Up).is_err() {
                        let _ = chan.try_set_state(call, ChanState::Hangup);
                    }
                } else {
                    // Answer without prior progress still owes the peer an ack
                    if !(chan.test_flag(CHAN_PROGRESS) || chan.test_flag(CHAN_MEDIA)) {
                        self.mcon.exec_command(pspan, pchan, 0, BoostEventId::CallStartAck, 0);
                    }
                    self.mcon.exec_command(pspan, pchan, 0, BoostEventId::CallAnswered, 0);
                }
            }
            ChanState::Dialing => {}
            ChanState::HangupComplete => {
                let _ = chan.try_set_state(call, ChanState::Down);
            }
            ChanState::Hangup => {
                if call.sflags & SFLAG_SENT_FINAL_RESPONSE != 0 {
                    let _ = chan.try_set_state(call, ChanState::Down);
                } else {
                    call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                    let reached_media = chan.test_flag(CHAN_ANSWERED)
                        || chan.test_flag(CHAN_PROGRESS)
                        || chan.test_flag(CHAN_MEDIA);
                    if reached_media {
                        self.mcon.exec_command(
                            pspan,
                            pchan,
                            0,
                            BoostEventId::CallStopped,
                            call.caller_data.hangup_cause,
                        );
                    } else {
                        self.mcon.exec_command(
                            pspan,
                            pchan,
                            0,
                            BoostEventId::CallStartNack,
                            call.caller_data.hangup_cause,
                        );
                    }
                }
            }
            ChanState::Cancel => {
                let _ = self.span.signal(chan, SigEvent::Stop);
                let _ = chan.try_set_state(call, ChanState::Down);
                call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                self.mcon
                    .exec_command(pspan, pchan, 0, BoostEventId::CallStartNackAck, 0);
            }
            ChanState::Terminating => {
                let _ = self.span.signal(chan, SigEvent::Stop);
                let _ = chan.try_set_state(call, ChanState::HangupComplete);
                call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                self.mcon
                    .exec_command(pspan, pchan, 0, BoostEventId::CallStoppedAck, 0);
            }
        }
    }

    // ── Link lifecycle ───────────────────────────────────────────

    /// Announces our restart to the peer and zeroes the request table.
    /// Called when the pump starts and again on shutdown.
    pub(crate) fn link_startup(&self) {
        self.arbiter.reset();
        self.pcon.exec_command(0, 0, 0, BoostEventId::SystemRestart, 0);
        self.mcon.flags.set(LINK_DOWN);
    }

    pub(crate) fn link_shutdown(&self) {
        self.pcon.exec_command(0, 0, 0, BoostEventId::SystemRestart, 0);
        self.mcon.flags.set(LINK_DOWN);
    }

    // ── Introspection ────────────────────────────────────────────

    pub fn restarting(&self) -> bool {
        self.flags.test(BOOST_RESTARTING)
    }

    pub fn request_in_use(&self, id: SetupId) -> bool {
        self.arbiter.id_in_use(id)
    }

    pub fn request_nacked(&self, id: SetupId) -> bool {
        self.arbiter.is_nacked(id)
    }

    pub fn trunk_group_congested(&self, tg: usize) -> bool {
        self.congestion.check(tg)
    }

    pub fn setup_grid_consistent(&self) -> bool {
        self.arbiter.grid_consistent()
    }

    pub fn main_local_addr(&self) -> Option<SocketAddr> {
        self.mcon.local_addr()
    }

    pub fn priority_local_addr(&self) -> Option<SocketAddr> {
        self.pcon.local_addr()
    }
}
