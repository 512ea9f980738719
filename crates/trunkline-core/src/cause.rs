//! Q.850-style release causes used on the wire and in caller data

pub const CAUSE_NORMAL_CLEARING: u8 = 16;
pub const CAUSE_USER_BUSY: u8 = 17;
pub const CAUSE_DESTINATION_OUT_OF_ORDER: u8 = 27;
pub const CAUSE_NORMAL_CIRCUIT_CONGESTION: u8 = 34;

/// Boost NACK cause: the peer has no free circuit in the trunk group.
/// Triggers congestion back-off before being rewritten.
pub const CAUSE_ALL_CKTS_BUSY: u8 = 117;
/// Boost NACK cause: the setup id is already in use on the peer side
pub const CAUSE_CSUPID_DBL_USE: u8 = 118;

/// Both proprietary boost setup-failure causes surface as plain user busy
pub fn normalize_release_cause(cause: u8) -> u8 {
    match cause {
        CAUSE_ALL_CKTS_BUSY | CAUSE_CSUPID_DBL_USE => CAUSE_USER_BUSY,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_release_cause(CAUSE_ALL_CKTS_BUSY), 17);
        assert_eq!(normalize_release_cause(CAUSE_CSUPID_DBL_USE), 17);
        assert_eq!(normalize_release_cause(16), 16);
    }
}
