/// Largest originating SETUP PDU we keep a copy of. Responses echo IEs from
/// the stored message, so this is an owned buffer rather than a decoder ref.
pub const MAX_RAW_SETUP: usize = 1024;

/// Number with presentation/screening qualifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberInfo {
    pub digits: String,
}

impl NumberInfo {
    pub fn from_digits(digits: &str) -> Self {
        Self { digits: digits.to_string() }
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

/// Per-call addressing and teardown data, zeroed when the channel
/// returns to DOWN.
#[derive(Debug, Clone, Default)]
pub struct CallerData {
    /// Calling party number
    pub cid_num: NumberInfo,
    /// Calling party display name
    pub cid_name: String,
    /// Automatic Number Identification; outbound boost calls may carry a
    /// trailing `@<policy><tg>` hunt-group selector here
    pub ani: NumberInfo,
    /// Dialed number
    pub dnis: NumberInfo,
    /// Redirecting number
    pub rdnis: NumberInfo,

    /// Calling number screening indicator
    pub screen: u8,
    /// Calling number presentation indicator
    pub pres: u8,

    /// Q.850-style release cause for teardown
    pub hangup_cause: u8,

    /// Q.931 call reference value (ISDN only)
    pub crv: u16,
    /// CRV direction flag, inverted from the originating SETUP for replies
    pub crv_flag: bool,

    /// Owned copy of the originating SETUP message, truncated to
    /// [`MAX_RAW_SETUP`]. Replies are assembled from this.
    pub raw_setup: Vec<u8>,
}

impl CallerData {
    /// Stores a copy of the originating SETUP bytes, truncating oversized PDUs
    pub fn store_raw_setup(&mut self, raw: &[u8]) {
        let len = raw.len().min(MAX_RAW_SETUP);
        self.raw_setup = raw[..len].to_vec();
    }
}
