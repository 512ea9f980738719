//! Decoded Q.931 information elements.
//!
//! Only the fields this stack actually inspects or fills are modeled;
//! the byte-level IE codec lives in the external Q.921/Q.931 stack.

/// Bearer capability IE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCap {
    /// Coding standard: ITU-T = 0, ISO/IEC = 1, National = 2, Network = 3
    pub cod_stand: u8,
    /// Information transfer capability, 0 = speech
    pub itc: u8,
    /// Transfer mode: circuit = 0, packet = 1
    pub trans_mode: u8,
    /// Information transfer rate, 16 = 64 kbit/s
    pub itr: u8,
    pub layer1_ident: u8,
    /// User info layer 1 protocol: u-law = 2, a-law = 3
    pub uil1_prot: u8,
}

impl BearerCap {
    /// Speech over a 64 kbit/s u-law circuit, the profile used for
    /// outbound SETUPs
    pub fn speech_64k_ulaw() -> Self {
        Self {
            cod_stand: 0,
            itc: 0,
            trans_mode: 0,
            itr: 16,
            layer1_ident: 1,
            uil1_prot: 2,
        }
    }
}

/// Channel identification IE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIdIe {
    /// PRI = 1, BRI = 0
    pub int_type: u8,
    pub info_chan_sel: u8,
    /// 3 = B-channel map
    pub chan_map_type: u8,
    /// Selected timeslot, 1-based
    pub chan_slot: u8,
}

impl ChannelIdIe {
    /// B-channel selection on a PRI interface
    pub fn pri_bchan(chan_slot: u8) -> Self {
        Self {
            int_type: 1,
            info_chan_sel: 1,
            chan_map_type: 3,
            chan_slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallingNumberIe {
    pub typ_num: u8,
    pub num_plan_id: u8,
    pub digits: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalledNumberIe {
    pub typ_num: u8,
    pub num_plan_id: u8,
    pub digits: String,
}

impl CalledNumberIe {
    /// National number in the E.164 numbering plan
    pub fn national_e164(digits: &str) -> Self {
        Self {
            typ_num: 2,
            num_plan_id: 1,
            digits: digits.to_string(),
        }
    }
}

/// Cause IE carried in DISCONNECT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseIe {
    pub cod_stand: u8,
    pub location: u8,
    pub recom: u8,
    /// Q.850 cause value
    pub value: u8,
}

impl CauseIe {
    pub fn local_cause(value: u8) -> Self {
        Self {
            cod_stand: 0,
            location: 1,
            recom: 1,
            value,
        }
    }
}
