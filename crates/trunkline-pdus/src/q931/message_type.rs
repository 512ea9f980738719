/// Q.931 message types handled by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Q931MessageType {
    Alerting,
    CallProceeding,
    Connect,
    ConnectAck,
    Progress,
    Setup,
    Disconnect,
    Release,
    ReleaseComplete,
    Restart,
    RestartAck,
    Status,
}

impl Q931MessageType {
    /// Convert this enum back into the raw message type octet
    pub fn into_raw(self) -> u8 {
        match self {
            Q931MessageType::Alerting => 0x01,
            Q931MessageType::CallProceeding => 0x02,
            Q931MessageType::Connect => 0x07,
            Q931MessageType::ConnectAck => 0x0f,
            Q931MessageType::Progress => 0x03,
            Q931MessageType::Setup => 0x05,
            Q931MessageType::Disconnect => 0x45,
            Q931MessageType::Release => 0x4d,
            Q931MessageType::ReleaseComplete => 0x5a,
            Q931MessageType::Restart => 0x46,
            Q931MessageType::RestartAck => 0x4e,
            Q931MessageType::Status => 0x7d,
        }
    }
}

impl core::fmt::Display for Q931MessageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Q931MessageType::Alerting => "ALERTING",
            Q931MessageType::CallProceeding => "CALL_PROCEEDING",
            Q931MessageType::Connect => "CONNECT",
            Q931MessageType::ConnectAck => "CONNECT_ACKNOWLEDGE",
            Q931MessageType::Progress => "PROGRESS",
            Q931MessageType::Setup => "SETUP",
            Q931MessageType::Disconnect => "DISCONNECT",
            Q931MessageType::Release => "RELEASE",
            Q931MessageType::ReleaseComplete => "RELEASE_COMPLETE",
            Q931MessageType::Restart => "RESTART",
            Q931MessageType::RestartAck => "RESTART_ACKNOWLEDGE",
            Q931MessageType::Status => "STATUS",
        };
        write!(f, "{}", name)
    }
}
