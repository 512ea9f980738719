use bitcode::{Decode, Encode};

/// Event identifiers recognized on the boost sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum BoostEventId {
    CallStart,
    CallStopped,
    CallStartAck,
    CallStartNack,
    CallStartNackAck,
    CallStoppedAck,
    CallAnswered,
    Heartbeat,
    SystemRestart,
    SystemRestartAck,
    InsertCheckLoop,
    RemoveCheckLoop,
    AutoCallGapAbate,
    DigitIn,
}

impl BoostEventId {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u8 {
        match self {
            BoostEventId::CallStart => 0x80,
            BoostEventId::CallStopped => 0x81,
            BoostEventId::CallStartAck => 0x82,
            BoostEventId::CallStartNack => 0x83,
            BoostEventId::CallStartNackAck => 0x84,
            BoostEventId::CallStoppedAck => 0x85,
            BoostEventId::CallAnswered => 0x86,
            BoostEventId::Heartbeat => 0x87,
            BoostEventId::SystemRestart => 0x88,
            BoostEventId::SystemRestartAck => 0x89,
            BoostEventId::InsertCheckLoop => 0x8a,
            BoostEventId::RemoveCheckLoop => 0x8b,
            BoostEventId::AutoCallGapAbate => 0x8c,
            BoostEventId::DigitIn => 0x8d,
        }
    }
}

impl core::fmt::Display for BoostEventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            BoostEventId::CallStart => "CALL_START",
            BoostEventId::CallStopped => "CALL_STOPPED",
            BoostEventId::CallStartAck => "CALL_START_ACK",
            BoostEventId::CallStartNack => "CALL_START_NACK",
            BoostEventId::CallStartNackAck => "CALL_START_NACK_ACK",
            BoostEventId::CallStoppedAck => "CALL_STOPPED_ACK",
            BoostEventId::CallAnswered => "CALL_ANSWERED",
            BoostEventId::Heartbeat => "HEARTBEAT",
            BoostEventId::SystemRestart => "SYSTEM_RESTART",
            BoostEventId::SystemRestartAck => "SYSTEM_RESTART_ACK",
            BoostEventId::InsertCheckLoop => "INSERT_CHECK_LOOP",
            BoostEventId::RemoveCheckLoop => "REMOVE_CHECK_LOOP",
            BoostEventId::AutoCallGapAbate => "AUTO_CALL_GAP_ABATE",
            BoostEventId::DigitIn => "DIGIT_IN",
        };
        write!(f, "{}", name)
    }
}
