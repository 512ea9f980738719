pub mod ies;
pub mod message;
pub mod message_type;

pub use ies::{BearerCap, CalledNumberIe, CallingNumberIe, CauseIe, ChannelIdIe};
pub use message::Q931Message;
pub use message_type::Q931MessageType;
