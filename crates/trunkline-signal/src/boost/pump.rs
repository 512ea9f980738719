use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use trunkline_core::flags::LINK_DOWN;

use crate::io::{HwEvent, SpanIo};

use super::connection::SocketKind;
use super::engine::{BOOST_RUNNING, BoostSpan};

/// Pump tick, also the heartbeat accounting granularity
const TICK: Duration = Duration::from_millis(10);

/// Hardware event poll granularity for the events thread
const EVENT_POLL: Duration = Duration::from_millis(100);

/// Join handles for the two per-span worker threads
pub struct BoostHandles {
    signaling: JoinHandle<()>,
    events: JoinHandle<()>,
}

impl BoostSpan {
    /// Spawns the signaling thread (event pump + state advancer) and the
    /// events thread (hardware poll). The span stays suspended until the
    /// restart handshake with the peer completes.
    pub fn start(self: &Arc<Self>, io: Arc<dyn SpanIo>) -> BoostHandles {
        self.flags.set(BOOST_RUNNING);

        let engine = self.clone();
        let signaling = thread::Builder::new()
            .name(format!("boost-sig-{}", self.span().span_id))
            .spawn(move || signaling_run(engine))
            .expect("failed to spawn boost signaling thread");

        let engine = self.clone();
        let events = thread::Builder::new()
            .name(format!("boost-events-{}", self.span().span_id))
            .spawn(move || events_run(engine, io))
            .expect("failed to spawn boost events thread");

        BoostHandles { signaling, events }
    }

    /// Stops both threads; the signaling thread tells the peer we are going
    /// away on its way out.
    pub fn stop(&self, handles: BoostHandles) {
        self.flags.clear(BOOST_RUNNING);
        let _ = handles.signaling.join();
        let _ = handles.events.join();
    }

    pub fn running(&self) -> bool {
        self.flags.test(BOOST_RUNNING)
    }
}

/// Signaling thread: pumps both sockets on a 10 ms tick, draining the
/// priority socket to empty per tick to keep heartbeat latency low, then
/// advances channel states.
fn signaling_run(engine: Arc<BoostSpan>) {
    tracing::debug!("boost signaling thread starting");

    engine.link_startup();

    'outer: while engine.flags.test(BOOST_RUNNING) {
        let mut activity = false;

        // Drain the priority socket completely
        loop {
            match engine.pcon.read_event() {
                Ok(Some(event)) => {
                    engine.process_event(SocketKind::Priority, &event);
                    activity = true;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Socket Error! [{}]", e);
                    break 'outer;
                }
            }
        }

        // One read from the main socket per tick
        match engine.mcon.read_event() {
            Ok(Some(event)) => {
                engine.process_event(SocketKind::Main, &event);
                activity = true;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Socket Error! [{}]", e);
                break 'outer;
            }
        }

        if !activity {
            thread::sleep(TICK);
        }

        if engine.span().suspended() || engine.mcon.flags.test(LINK_DOWN) {
            engine.pcon.reset_hb();
        } else {
            engine.pcon.add_hb_elapsed(TICK.as_millis() as u64);
        }

        engine.advance_states();
    }

    engine.link_shutdown();
    tracing::debug!("boost signaling thread ended");
}

/// Events thread: polls the hardware layer so DTMF lands on the channel's
/// digit queue even while the signaling thread is busy.
fn events_run(engine: Arc<BoostSpan>, io: Arc<dyn SpanIo>) {
    tracing::debug!("boost events thread starting");

    while engine.flags.test(BOOST_RUNNING) {
        match io.poll_event(EVENT_POLL) {
            Some(HwEvent::Dtmf { chan_id, digits }) => match engine.span().chan(chan_id) {
                Some(chan) => chan.queue_dtmf(&digits),
                None => tracing::warn!("DTMF for unknown channel {}", chan_id),
            },
            None => {}
        }
    }

    tracing::debug!("boost events thread ended");
}
