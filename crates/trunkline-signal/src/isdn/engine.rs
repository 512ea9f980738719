use std::sync::{Arc, Mutex};

use trunkline_config::IsdnCfg;
use trunkline_core::flags::{
    AtomicFlags, CHAN_INUSE, CHAN_OUTBOUND, CHAN_STATE_CHANGE, SFLAG_SENT_FINAL_RESPONSE, SPAN_STATE_CHANGE,
};
use trunkline_core::{CallerData, ChanState, ChanType};
use trunkline_pdus::q931::{BearerCap, CalledNumberIe, CauseIe, ChannelIdIe, Q931Message, Q931MessageType};

use crate::channel::{CallState, Channel, StateRefused};
use crate::sigmsg::SigEvent;
use crate::span::Span;

use super::link::Q921Link;

pub(crate) const ISDN_RUNNING: u32 = 1 << 0;

const ADVANCE_PASSES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsdnErr {
    /// The span carries no Q.921 D-channel
    NoDchannel,
}

#[derive(Debug)]
pub enum IsdnCallErr {
    ChannelBusy,
    Refused(StateRefused),
}

/// ISDN PRI signaling engine for one span: the Q.931 dispatcher and the
/// state advancer, on top of an external Q.921/Q.931 stack.
pub struct IsdnSpan {
    span: Arc<Span>,
    cfg: IsdnCfg,
    pub(crate) link: Mutex<Box<dyn Q921Link>>,
    pub(crate) flags: AtomicFlags,
}

impl IsdnSpan {
    pub fn new(span: Arc<Span>, cfg: IsdnCfg, link: Box<dyn Q921Link>) -> Result<Arc<Self>, IsdnErr> {
        if !span.channels().any(|c| c.chan_type == ChanType::DQ921) {
            return Err(IsdnErr::NoDchannel);
        }

        Ok(Arc::new(Self {
            span,
            cfg,
            link: Mutex::new(link),
            flags: AtomicFlags::default(),
        }))
    }

    pub fn span(&self) -> &Arc<Span> {
        &self.span
    }

    pub fn cfg(&self) -> &IsdnCfg {
        &self.cfg
    }

    // ── Outbound entry points (application thread) ───────────────

    /// Claims a bearer channel and starts dialing; the advancer assembles
    /// and sends the SETUP.
    pub fn outgoing_call(&self, chan: &Arc<Channel>, caller_data: &CallerData) -> Result<(), IsdnCallErr> {
        chan.open().map_err(|_| IsdnCallErr::ChannelBusy)?;
        chan.flags.set(CHAN_OUTBOUND);
        let mut call = chan.lock();
        call.caller_data = caller_data.clone();
        chan.try_set_state(&mut call, ChanState::Dialing)
            .map_err(IsdnCallErr::Refused)
    }

    /// Application-driven state transition (accept, progress, answer)
    pub fn request_state(&self, chan: &Arc<Channel>, to: ChanState) -> Result<(), StateRefused> {
        chan.set_state_locked(to)
    }

    /// Tears the call down with the given release cause
    pub fn hangup(&self, chan: &Arc<Channel>, cause: u8) -> Result<(), StateRefused> {
        let mut call = chan.lock();
        call.caller_data.hangup_cause = cause;
        chan.try_set_state(&mut call, ChanState::Hangup)
    }

    // ── Q.931 dispatcher (signaling thread) ──────────────────────

    /// Maps one received Q.931 message onto a channel action
    pub fn dispatch_q931(&self, msg: &Q931Message) {
        tracing::debug!("<- {} CRV={}", msg.mes_type, msg.crv);

        match msg.mes_type {
            Q931MessageType::Setup => self.handle_setup(msg),
            Q931MessageType::Restart => self.handle_restart(msg),
            Q931MessageType::Alerting => self.drive(msg, ChanState::ProgressMedia),
            Q931MessageType::Progress => self.drive(msg, ChanState::Progress),
            Q931MessageType::Connect => self.drive(msg, ChanState::Up),
            Q931MessageType::Disconnect => self.drive(msg, ChanState::Terminating),
            Q931MessageType::Release | Q931MessageType::ReleaseComplete => self.drive(msg, ChanState::Down),
            other => {
                tracing::debug!("No channel action for {}", other);
            }
        }
    }

    /// Finds the channel a message addresses: the ChanID slot when present,
    /// otherwise the live call matching the CRV
    fn find_chan(&self, msg: &Q931Message) -> Option<Arc<Channel>> {
        if let Some(slot) = msg.chan_slot() {
            return self.span.chan(slot as u32).cloned();
        }
        self.span
            .channels()
            .find(|c| c.test_flag(CHAN_INUSE) && c.lock().caller_data.crv == msg.crv)
            .cloned()
    }

    fn drive(&self, msg: &Q931Message, to: ChanState) {
        let Some(chan) = self.find_chan(msg) else {
            tracing::warn!("{} for unknown channel (CRV {})", msg.mes_type, msg.crv);
            return;
        };
        let _ = chan.set_state_locked(to);
    }

    fn handle_setup(&self, msg: &Q931Message) {
        let Some(slot) = msg.chan_slot() else {
            tracing::warn!("SETUP without a ChanID");
            return;
        };
        let Some(chan) = self.span.chan(slot as u32).cloned() else {
            tracing::warn!("SETUP for nonexistent channel {}", slot);
            return;
        };

        if chan.test_flag(CHAN_INUSE) || chan.state() != ChanState::Down {
            tracing::error!("SETUP for channel {}:{} which is already in use", chan.span_id, chan.chan_id);
            return;
        }
        if chan.open().is_err() {
            tracing::error!("OPEN ERROR on channel {}:{}", chan.span_id, chan.chan_id);
            return;
        }

        let mut call = chan.lock();
        call.caller_data = CallerData::default();
        if let Some(calling) = &msg.calling_num {
            call.caller_data.cid_num.digits = calling.digits.clone();
            call.caller_data.cid_name = calling.digits.clone();
            call.caller_data.ani.digits = calling.digits.clone();
        }
        if let Some(called) = &msg.called_num {
            call.caller_data.dnis.digits = called.digits.clone();
        }
        call.caller_data.crv = msg.crv;
        // Replies carry the flipped CRV flag
        call.caller_data.crv_flag = !msg.crv_flag;
        call.caller_data.store_raw_setup(&msg.raw);

        let _ = chan.try_set_state(&mut call, ChanState::Ring);
    }

    /// RESTART with a ChanID hits one channel, without one the whole span
    fn handle_restart(&self, msg: &Q931Message) {
        if let Some(slot) = msg.chan_slot() {
            if let Some(chan) = self.span.chan(slot as u32) {
                let _ = chan.set_state_locked(ChanState::Restart);
            }
        } else {
            for chan in self.span.channels() {
                let _ = chan.set_state_locked(ChanState::Restart);
            }
        }
    }

    // ── State advancer ───────────────────────────────────────────

    pub fn advance_states(&self) {
        for _ in 0..ADVANCE_PASSES {
            if !self.span.flags.take(SPAN_STATE_CHANGE) {
                break;
            }
            for chan in self.span.channels() {
                if !chan.flags.take(CHAN_STATE_CHANGE) {
                    continue;
                }
                let mut call = chan.lock();
                self.state_advance(chan, &mut call);
            }
        }
    }

    fn state_advance(&self, chan: &Arc<Channel>, call: &mut CallState) {
        tracing::debug!("{}:{} STATE [{}]", chan.span_id, chan.chan_id, call.state);

        match call.state {
            ChanState::Down => {
                call.extra_id = 0;
                call.sflags = 0;
                chan.done(call);
            }
            ChanState::Progress => {
                if chan.test_flag(CHAN_OUTBOUND) {
                    if self.span.signal(chan, SigEvent::Progress).is_err() {
                        let _ = chan.try_set_state(call, ChanState::Hangup);
                    }
                } else {
                    self.tx(reply_from_call(call, Q931MessageType::Progress));
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
            ChanState::ProgressMedia => {
                if chan.test_flag(CHAN_OUTBOUND) {
                    if self.span.signal(chan, SigEvent::ProgressMedia).is_err() {
                        let _ = chan.try_set_state(call, ChanState::Hangup);
                    }
                } else {
                    self.tx(reply_from_call(call, Q931MessageType::Alerting));
                }
            }
            ChanState::Up => {
                if chan.test_flag(CHAN_OUTBOUND) {
                    if self.span.signal(chan, SigEvent::Up).is_err() {
                        let _ = chan.try_set_state(call, ChanState::Hangup);
                    }
                } else {
                    self.tx(reply_from_call(call, Q931MessageType::Connect));
                }
            }
            ChanState::Dialing => {
                let mut msg = Q931Message::new(Q931MessageType::Setup, call.caller_data.crv, call.caller_data.crv_flag);
                msg.bearer_cap = Some(BearerCap::speech_64k_ulaw());
                msg.chan_id = Some(ChannelIdIe::pri_bchan(chan.chan_id as u8));
                msg.called_num = Some(CalledNumberIe::national_e164(&call.caller_data.ani.digits));
                self.tx(msg);
            }
            ChanState::Hangup => {
                if call.sflags & SFLAG_SENT_FINAL_RESPONSE != 0 {
                    let _ = chan.try_set_state(call, ChanState::Down);
                } else {
                    call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                    let mut msg = reply_from_call(call, Q931MessageType::Disconnect);
                    msg.cause = Some(CauseIe::local_cause(call.caller_data.hangup_cause));
                    self.tx(msg);
                }
            }
            ChanState::Terminating => {
                let _ = self.span.signal(chan, SigEvent::Stop);
                call.sflags |= SFLAG_SENT_FINAL_RESPONSE;
                self.tx(reply_from_call(call, Q931MessageType::Release));
            }
            ChanState::Cancel => {
                let _ = self.span.signal(chan, SigEvent::Stop);
                let _ = chan.try_set_state(call, ChanState::Down);
            }
            ChanState::HangupComplete => {
                let _ = chan.try_set_state(call, ChanState::Down);
            }
        }
    }

    fn tx(&self, msg: Q931Message) {
        tracing::debug!("-> {} CRV={}", msg.mes_type, msg.crv);
        if let Err(e) = self.link.lock().expect("q921 link mutex blocked").tx_message(&msg) {
            tracing::error!("Failed to tx {} [{}]", msg.mes_type, e);
        }
    }
}

/// Builds a reply carrying the call's CRV with the flag already flipped
/// from the originating SETUP
fn reply_from_call(call: &CallState, mes_type: Q931MessageType) -> Q931Message {
    let mut msg = Q931Message::new(mes_type, call.caller_data.crv, call.caller_data.crv_flag);
    msg.raw = call.caller_data.raw_setup.clone();
    msg
}
