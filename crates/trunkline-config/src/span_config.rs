use serde::Deserialize;
use trunkline_core::TrunkType;

/// Which signaling dialect drives the span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SignalMode {
    /// SS7-boost UDP proxy towards an external SS7 termination daemon
    Boost,
    /// ISDN PRI, Q.921/Q.931 over the D-channel
    Isdn,
}

/// Q.921 side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LinkRole {
    Network,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IsdnDialect {
    National,
    Dms,
    FiveEss,
    Euro,
}

/// SS7-boost signaling configuration. The priority socket always uses the
/// base ports plus one on both ends.
#[derive(Debug, Clone)]
pub struct BoostCfg {
    /// Bind address of the main socket
    pub local_ip: String,
    /// Base local UDP port
    pub local_port: u16,
    /// Peer address
    pub remote_ip: String,
    /// Base remote UDP port
    pub remote_port: u16,
    /// Sanity deadline for a parked outbound channel request
    pub request_timeout_ms: u64,
}

impl Default for BoostCfg {
    fn default() -> Self {
        Self {
            local_ip: "127.0.0.65".to_string(),
            local_port: 53000,
            remote_ip: "127.0.0.66".to_string(),
            remote_port: 53000,
            request_timeout_ms: 5000,
        }
    }
}

/// ISDN PRI signaling configuration
#[derive(Debug, Clone)]
pub struct IsdnCfg {
    pub role: LinkRole,
    pub dialect: IsdnDialect,
    /// Suggest (rather than demand) the B-channel in outbound SETUPs
    pub suggest_channel: bool,
    /// The Q.931 stack acknowledges RESTART on its own
    pub auto_restart_ack: bool,
    /// The Q.931 stack acknowledges CONNECT on its own
    pub auto_connect_ack: bool,
}

impl Default for IsdnCfg {
    fn default() -> Self {
        Self {
            role: LinkRole::User,
            dialect: IsdnDialect::National,
            suggest_channel: false,
            auto_restart_ack: true,
            auto_connect_ack: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpanConfig {
    pub span_id: u32,
    pub trunk_type: TrunkType,
    pub signal_mode: SignalMode,
    pub debug_log: Option<String>,

    pub boost: Option<BoostCfg>,
    pub isdn: Option<IsdnCfg>,
}

impl SpanConfig {
    pub fn new(span_id: u32, trunk_type: TrunkType, signal_mode: SignalMode) -> Self {
        Self {
            span_id,
            trunk_type,
            signal_mode,
            debug_log: None,
            boost: None,
            isdn: None,
        }
    }

    /// Validate that all required configuration sections are present
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.span_id == 0 {
            return Err("span_id must be 1 or higher");
        }
        match self.signal_mode {
            SignalMode::Boost => {
                let Some(ref boost) = self.boost else {
                    return Err("boost configuration must be provided for Boost signaling");
                };
                if boost.local_port == u16::MAX || boost.remote_port == u16::MAX {
                    return Err("boost base port leaves no room for the priority socket");
                }
                if boost.request_timeout_ms == 0 {
                    return Err("request_timeout_ms must be non-zero");
                }
            }
            SignalMode::Isdn => {
                if self.isdn.is_none() {
                    return Err("isdn configuration must be provided for Isdn signaling");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_dialect_section() {
        let mut cfg = SpanConfig::new(1, TrunkType::T1, SignalMode::Boost);
        assert!(cfg.validate().is_err());
        cfg.boost = Some(BoostCfg::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_boost_defaults() {
        let boost = BoostCfg::default();
        assert_eq!(boost.local_ip, "127.0.0.65");
        assert_eq!(boost.remote_ip, "127.0.0.66");
        assert_eq!(boost.local_port, 53000);
        assert_eq!(boost.remote_port, 53000);
        assert_eq!(boost.request_timeout_ms, 5000);
    }
}
