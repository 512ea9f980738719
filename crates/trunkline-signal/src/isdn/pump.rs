use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::engine::{ISDN_RUNNING, IsdnSpan};
use super::link::{DchanIo, WaitStatus};

/// D-channel wait granularity, also drives the Q.921 timer tick
const DCHAN_WAIT: Duration = Duration::from_millis(100);

/// Consecutive read failures before the pump gives up on the span
const MAX_READ_ERRORS: u32 = 10;

impl IsdnSpan {
    /// Spawns the signaling thread: waits on the D-channel, ticks the
    /// Q.921 timers, and advances channel states.
    pub fn start(self: &Arc<Self>, dchan_io: Arc<dyn DchanIo>) -> JoinHandle<()> {
        self.flags.set(ISDN_RUNNING);
        self.link.lock().expect("q921 link mutex blocked").start();

        let engine = self.clone();
        thread::Builder::new()
            .name(format!("isdn-sig-{}", self.span().span_id))
            .spawn(move || isdn_run(engine, dchan_io))
            .expect("failed to spawn isdn signaling thread")
    }

    pub fn stop(&self, handle: JoinHandle<()>) {
        self.flags.clear(ISDN_RUNNING);
        let _ = handle.join();
    }

    pub fn running(&self) -> bool {
        self.flags.test(ISDN_RUNNING)
    }
}

fn isdn_run(engine: Arc<IsdnSpan>, dchan_io: Arc<dyn DchanIo>) {
    tracing::debug!("ISDN thread starting");

    let mut errs = 0u32;
    let mut buf = [0u8; 1024];

    while engine.flags.test(ISDN_RUNNING) {
        let status = dchan_io.wait_read(DCHAN_WAIT);

        engine.link.lock().expect("q921 link mutex blocked").tick();
        engine.advance_states();

        match status {
            WaitStatus::Fail => {
                tracing::error!("D-Chan Read Error!");
                engine.span().set_last_error("D-Chan Read Error!");
                errs += 1;
                if errs == MAX_READ_ERRORS {
                    break;
                }
            }
            WaitStatus::Timeout => {
                errs = 0;
            }
            WaitStatus::Ready => {
                errs = 0;
                match dchan_io.read(&mut buf) {
                    Ok(len) if len > 0 => {
                        let msgs = {
                            let mut link = engine.link.lock().expect("q921 link mutex blocked");
                            link.rx_frame(&buf[..len])
                        };
                        for msg in msgs {
                            engine.dispatch_q931(&msg);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("D-Chan Read Error! [{}]", e);
                        errs += 1;
                        if errs == MAX_READ_ERRORS {
                            break;
                        }
                    }
                }
            }
        }
    }

    engine.flags.clear(ISDN_RUNNING);
    tracing::debug!("ISDN thread ended");
}
