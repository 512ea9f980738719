use super::ies::{BearerCap, CalledNumberIe, CallingNumberIe, CauseIe, ChannelIdIe};
use super::message_type::Q931MessageType;

/// A decoded Q.931 message as exchanged with the Q.921/Q.931 stack.
///
/// Received messages keep their encoded form in `raw` so replies can echo
/// IEs from the originating SETUP.
#[derive(Debug, Clone)]
pub struct Q931Message {
    pub mes_type: Q931MessageType,
    /// Call reference value identifying the call within the span
    pub crv: u16,
    /// CRV direction flag; replies carry the inverse of the SETUP's flag
    pub crv_flag: bool,

    pub bearer_cap: Option<BearerCap>,
    pub chan_id: Option<ChannelIdIe>,
    pub calling_num: Option<CallingNumberIe>,
    pub called_num: Option<CalledNumberIe>,
    pub cause: Option<CauseIe>,

    /// Encoded PDU bytes as received, empty for locally built messages
    pub raw: Vec<u8>,
}

impl Q931Message {
    pub fn new(mes_type: Q931MessageType, crv: u16, crv_flag: bool) -> Self {
        Self {
            mes_type,
            crv,
            crv_flag,
            bearer_cap: None,
            chan_id: None,
            calling_num: None,
            called_num: None,
            cause: None,
            raw: Vec::new(),
        }
    }

    /// Timeslot from the ChanID IE, if the message carries one
    pub fn chan_slot(&self) -> Option<u8> {
        self.chan_id.as_ref().map(|ie| ie.chan_slot)
    }
}
