use std::fmt;

/// Where the session stands with respect to the token channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not started, or shut down
    #[default]
    Idle,
    /// The poller owns the token channel
    PollingActive,
    /// A provisioning workflow owns the token channel; polling is suspended
    WorkflowExclusive,
}

impl SessionState {
    pub fn is_polling(self) -> bool {
        self == SessionState::PollingActive
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::PollingActive => "polling",
            SessionState::WorkflowExclusive => "exclusive",
        };
        f.write_str(name)
    }
}
