//! Per-span telephony signaling engine.
//!
//! Two independent dialects attach to a [`span::Span`]: the SS7-boost UDP
//! proxy ([`boost::BoostSpan`]) and ISDN PRI ([`isdn::IsdnSpan`]). Both share
//! the channel table, the declarative state map, and the state-advancer
//! pattern: handlers mark pending state changes, the advancer drains them
//! under the channel mutex and performs the per-state action (upstream
//! signal event and/or outbound protocol message).

pub mod boost;
pub mod channel;
pub mod io;
pub mod isdn;
pub mod sigmsg;
pub mod span;
pub mod state_map;

pub use channel::{CallState, ChanErr, Channel, StateRefused};
pub use sigmsg::{SigEvent, SigMsg, SigRefused, SignalCallback};
pub use span::Span;
pub use state_map::{DEFAULT_STATE_MAP, StateMap};
