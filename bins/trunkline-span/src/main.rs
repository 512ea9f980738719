use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use trunkline_config::{SignalMode, SpanConfig, toml_config};
use trunkline_core::{ChanType, debug};
use trunkline_signal::boost::BoostSpan;
use trunkline_signal::io::NullSpanIo;
use trunkline_signal::sigmsg::{SigMsg, SignalCallback};
use trunkline_signal::span::Span;

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SpanConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Build the boost signaling engine for the configured span
fn build_boost_span(cfg: &SpanConfig) -> (Arc<BoostSpan>, crossbeam_channel::Receiver<SigMsg>) {
    let (sig_tx, sig_rx) = crossbeam_channel::unbounded();
    let signal_cb: SignalCallback = Arc::new(move |msg: &SigMsg| {
        let _ = sig_tx.send(*msg);
        Ok(())
    });

    let chan_types = vec![ChanType::B; cfg.trunk_type.slot_count() as usize];
    let span = Span::new(cfg.span_id, cfg.trunk_type, &chan_types, signal_cb);

    let boost_cfg = cfg.boost.clone().expect("validated config carries a boost section");
    let engine = match BoostSpan::new(span, boost_cfg) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to bring up the boost signaling engine: {}", e);
            std::process::exit(1);
        }
    };

    (engine, sig_rx)
}

#[derive(Parser, Debug)]
#[command(
    author,
    version = trunkline_core::STACK_VERSION,
    about = "Trunkline span runner",
    long_about = "Runs one signaling span using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with span/signaling parameters")]
    config: String,
}

fn main() {
    eprintln!("trunkline-span {}", trunkline_core::STACK_VERSION);

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.debug_log.clone());

    let (engine, sig_rx) = match cfg.signal_mode {
        SignalMode::Isdn => {
            // The PRI dialect needs a Q.921 line driver binding, which no
            // bundled backend provides yet
            unimplemented!("Isdn mode needs an external Q.921 line driver");
        }
        SignalMode::Boost => build_boost_span(&cfg),
    };

    let handles = engine.start(Arc::new(NullSpanIo));
    tracing::info!("span {} signaling started", cfg.span_id);

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    // Surface upstream signal events until shutdown
    while running.load(Ordering::SeqCst) {
        match sig_rx.recv_timeout(Duration::from_millis(250)) {
            Ok(msg) => tracing::info!("{}:{} -> {:?}", msg.span_id, msg.chan_id, msg.event),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("shutting down");
    engine.stop(handles);
}
