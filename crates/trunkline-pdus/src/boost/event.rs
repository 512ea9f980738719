use bitcode::{Decode, Encode};
use trunkline_core::SetupId;

use super::event_id::BoostEventId;
use super::hunt::HuntPolicy;

/// One boost signaling message.
///
/// Every event carries the fixed correlation header (event id, setup id,
/// physical span/chan, release cause, trunk group); call setup additionally
/// fills the addressing fields. Span and chan are 0-based on the wire, one
/// below the channel-table ids.
#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct BoostEvent {
    pub event_id: Option<BoostEventId>,
    pub call_setup_id: SetupId,
    pub span: u8,
    pub chan: u8,
    pub release_cause: u8,
    pub trunk_group: u8,
    pub hunt_policy: HuntPolicy,
    /// Transmit sequence number, restarted with the connection
    pub seq: u32,

    pub calling_number_digits: String,
    pub called_number_digits: String,
    pub calling_name: String,
    pub isup_in_rdnis: String,
    pub calling_number_screening_ind: u8,
    pub calling_number_presentation: u8,
}

impl BoostEvent {
    /// Correlation-header-only event, the shape used for acks, teardown
    /// and recovery messages
    pub fn short(event_id: BoostEventId, span: u8, chan: u8, call_setup_id: SetupId, release_cause: u8) -> Self {
        Self {
            event_id: Some(event_id),
            call_setup_id,
            span,
            chan,
            release_cause,
            ..Default::default()
        }
    }

    /// Call setup event for an outbound request
    pub fn call_init(calling: &str, ani_digits: &str, call_setup_id: SetupId) -> Self {
        Self {
            event_id: Some(BoostEventId::CallStart),
            call_setup_id,
            calling_number_digits: calling.to_string(),
            called_number_digits: ani_digits.to_string(),
            ..Default::default()
        }
    }

    pub fn event_name(&self) -> String {
        match self.event_id {
            Some(id) => id.to_string(),
            None => "UNKNOWN".to_string(),
        }
    }
}
