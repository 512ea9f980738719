pub mod arbiter;
pub mod congestion;
pub mod connection;
pub mod engine;
pub mod pump;

pub use arbiter::{MAX_REQ_ID, RequestArbiter, RequestStatus};
pub use congestion::{CongestionTable, MAX_TRUNK_GROUPS, congestion_delay};
pub use connection::{BoostConnection, SocketKind};
pub use engine::{BoostErr, BoostSpan, RequestErr};
pub use pump::BoostHandles;
