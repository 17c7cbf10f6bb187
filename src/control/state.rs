//! Engine state
//!
//! One `EngineState` exists per client. The engine task, the lifecycle
//! classifier and the session resolver write it; everything else reads
//! snapshots.

use crate::types::identifiers::SessionId;

/// Observable state of the headless console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    /// The startup banner has been observed
    pub running: bool,
    /// The startup banner has not been observed yet
    pub starting: bool,
    /// Running and the session ID has been resolved at least once
    pub ready: bool,
    /// Value of the `Compatibility Hash: ` startup line
    pub compatibility_hash: Option<String>,
    /// Value of the `MachineID: ` startup line
    pub machine_id: Option<String>,
    /// Cached session ID, never replaced once set
    pub session_id: Option<SessionId>,
    /// Rejected session ID responses in the current resolution cycle
    pub session_id_attempts: u32,
    /// Command dispatch is suspended while the console streams its log
    pub log_mode: bool,
    /// Lines received while in log mode
    pub log_lines: u64,
    /// A command has been written and awaits its response
    pub in_flight: bool,
    /// Commands waiting behind the in-flight one
    pub queued: usize,
    /// The console stream has ended or the client was shut down
    pub closed: bool,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            running: false,
            starting: true,
            ready: false,
            compatibility_hash: None,
            machine_id: None,
            session_id: None,
            session_id_attempts: 0,
            log_mode: false,
            log_lines: 0,
            in_flight: false,
            queued: 0,
            closed: false,
        }
    }
}

impl EngineState {
    /// Whether a command written now would be dispatched immediately
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.closed && !self.in_flight && self.queued == 0 && !self.log_mode
    }
}
