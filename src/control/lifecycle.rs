//! Startup output classification
//!
//! Before the world is ready the console prints a banner carrying metadata
//! and finally a line announcing that the world runs. Those lines are
//! recognised here by fixed prefixes.

use super::state::EngineState;

/// Prefix of the line carrying the compatibility hash
pub const COMPATIBILITY_HASH_MARKER: &str = "Compatibility Hash: ";

/// Prefix of the line carrying the machine identifier
pub const MACHINE_ID_MARKER: &str = "MachineID: ";

/// Prefix of the line announcing the running world
pub const WORLD_RUNNING_MARKER: &str = "World running...";

/// Trailing character of the console prompt
pub const PROMPT_MARKER: char = '>';

/// Outcome of classifying one console line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The line carried a startup marker and is not a command response
    pub matched: bool,
    /// The line moved the console into the running state for the first time
    pub started_running: bool,
}

/// Whether a line is the console echoing its prompt rather than an answer
#[must_use]
pub fn is_prompt_echo(line: &str) -> bool {
    line.trim().ends_with(PROMPT_MARKER)
}

/// Inspect a line received before readiness and update `state`
///
/// Does nothing once `state.ready` is set. The checks are not exclusive, each
/// marker is tested in turn.
pub fn classify(line: &str, state: &mut EngineState) -> Classification {
    let mut outcome = Classification::default();
    if state.ready {
        return outcome;
    }

    if let Some(hash) = line.strip_prefix(COMPATIBILITY_HASH_MARKER) {
        outcome.matched = true;
        if state.compatibility_hash.is_none() {
            log::info!("Compatibility hash: {}", hash.trim());
            state.compatibility_hash = Some(hash.trim().to_string());
        }
    }

    if let Some(machine_id) = line.strip_prefix(MACHINE_ID_MARKER) {
        outcome.matched = true;
        if state.machine_id.is_none() {
            log::info!("Machine ID: {}", machine_id.trim());
            state.machine_id = Some(machine_id.trim().to_string());
        }
    }

    if line.starts_with(WORLD_RUNNING_MARKER) {
        outcome.matched = true;
        state.starting = false;
        if !state.running {
            log::info!("World is running");
            state.running = true;
            outcome.started_running = true;
        }
    }

    outcome
}
