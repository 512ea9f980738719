
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    /// Call offered to us by the peer
    Inbound,
    /// Call initiated by the local application
    Outbound,
}

impl CallDirection {
    #[inline]
    pub fn is_outbound(&self) -> bool {
        matches!(self, CallDirection::Outbound)
    }
}
