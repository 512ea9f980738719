/// Per-channel call state.
///
/// Every dialect drives a channel through this superset; which edges are
/// legal is decided by the span's state map, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChanState {
    /// No call. Terminal sink of every call; per-call fields are zeroed on entry.
    #[default]
    Down,
    /// Outbound ISDN call, SETUP is being assembled and sent
    Dialing,
    /// Inbound call offered, waiting for the application to accept
    Ring,
    /// Call is proceeding, no media yet
    Progress,
    /// Call is proceeding with early media (aka EARLY_MEDIA)
    ProgressMedia,
    /// Call is answered and through-connected
    Up,
    /// Local teardown requested, final response not necessarily sent yet
    Hangup,
    /// Teardown finished, waiting to fall back to Down
    HangupComplete,
    /// Remote teardown in progress
    Terminating,
    /// Inbound call withdrawn by the peer before it was answered
    Cancel,
    /// Forced resynchronization, falls through to Down
    Restart,
}

impl ChanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChanState::Down => "DOWN",
            ChanState::Dialing => "DIALING",
            ChanState::Ring => "RING",
            ChanState::Progress => "PROGRESS",
            ChanState::ProgressMedia => "PROGRESS_MEDIA",
            ChanState::Up => "UP",
            ChanState::Hangup => "HANGUP",
            ChanState::HangupComplete => "HANGUP_COMPLETE",
            ChanState::Terminating => "TERMINATING",
            ChanState::Cancel => "CANCEL",
            ChanState::Restart => "RESTART",
        }
    }
}

impl core::fmt::Display for ChanState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
