pub mod codec;
pub mod event;
pub mod event_id;
pub mod hunt;

pub use codec::BoostCodec;
pub use event::BoostEvent;
pub use event_id::BoostEventId;
pub use hunt::{HuntPolicy, parse_ani_suffix};
