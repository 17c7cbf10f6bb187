//! Single-flight command queue
//!
//! The console answers commands strictly in the order it receives them and
//! has no request ids, so a response can only be matched to a command by
//! position. The queue therefore keeps at most one command in flight: the
//! head is written, the next eligible console line resolves it, and only then
//! is the following entry written.
//!
//! ```text
//!   Idle ── push ──▶ Dispatching ── response, timeout or cancel ──▶ Idle
//!                        │                    (next entry dispatched at once)
//!                        └── `log` written ──▶ Paused ── exit log mode ──▶ Idle
//! ```
//!
//! The queue is a plain state machine. Writing lines and reading the console
//! is left to the engine task driving it.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{HeadlessError, Result};
use crate::types::identifiers::CommandId;

/// Channel resolving a caller's pending command
pub type Responder = oneshot::Sender<Result<String>>;

/// What dispatching an entry means for the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular command awaiting one response line
    Command,
    /// Switch the console into log mode; no response is awaited
    EnterLogMode,
}

/// A command waiting for (or undergoing) dispatch
#[derive(Debug)]
pub struct QueueEntry {
    id: CommandId,
    text: String,
    kind: EntryKind,
    timeout: Option<Duration>,
    responder: Responder,
}

impl QueueEntry {
    /// A regular command
    pub fn command(
        id: CommandId,
        text: impl Into<String>,
        timeout: Option<Duration>,
        responder: Responder,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            kind: EntryKind::Command,
            timeout,
            responder,
        }
    }

    /// The `log` command, which pauses dispatch once written
    pub fn log_mode(id: CommandId, responder: Responder) -> Self {
        Self {
            id,
            text: crate::types::ConsoleCommand::Log.to_string(),
            kind: EntryKind::EnterLogMode,
            timeout: None,
            responder,
        }
    }

    /// Command ID
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Command text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn respond(self, result: Result<String>) {
        // The caller may have dropped its handle; nothing to deliver then
        let _ = self.responder.send(result);
    }
}

/// Line the engine must write after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Dispatched command
    pub id: CommandId,
    /// Text to write
    pub text: String,
    /// Kind of the dispatched entry
    pub kind: EntryKind,
}

/// Coarse queue state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing in flight
    Idle,
    /// One command written, waiting for its response
    Dispatching,
    /// Dispatch suspended (log mode)
    Paused,
}

struct InFlight {
    entry: QueueEntry,
    deadline: Option<Instant>,
}

/// FIFO of commands with at most one entry in flight
#[derive(Default)]
pub struct CommandQueue {
    pending: VecDeque<QueueEntry>,
    in_flight: Option<InFlight>,
    paused: bool,
}

impl CommandQueue {
    /// Create an empty, idle queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Never rejects.
    pub fn push(&mut self, entry: QueueEntry) {
        log::trace!("Queued {} `{}`", entry.id, entry.text);
        self.pending.push_back(entry);
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> QueueState {
        if self.in_flight.is_some() {
            QueueState::Dispatching
        } else if self.paused {
            QueueState::Paused
        } else {
            QueueState::Idle
        }
    }

    /// Number of entries waiting behind the in-flight one
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued or in flight
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }

    /// ID of the in-flight command
    #[must_use]
    pub fn in_flight_id(&self) -> Option<CommandId> {
        self.in_flight.as_ref().map(|f| f.entry.id)
    }

    /// Whether dispatch is suspended
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend dispatch
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume dispatch
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Move the head entry in flight if the queue is idle
    ///
    /// Returns the line that must be written now, or `None` if a command is
    /// already in flight, dispatch is paused or nothing is queued.
    pub fn dispatch_next(&mut self, now: Instant) -> Option<Dispatch> {
        if self.in_flight.is_some() || self.paused {
            return None;
        }

        let entry = self.pending.pop_front()?;
        let dispatch = Dispatch {
            id: entry.id,
            text: entry.text.clone(),
            kind: entry.kind,
        };
        let deadline = entry.timeout.map(|timeout| now + timeout);
        self.in_flight = Some(InFlight { entry, deadline });

        Some(dispatch)
    }

    /// Resolve the in-flight command with `result`
    ///
    /// Returns `false` if nothing was in flight.
    pub fn complete(&mut self, result: Result<String>) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.entry.respond(result);
                true
            }
            None => false,
        }
    }

    /// Deliver a response line to the in-flight command
    pub fn resolve(&mut self, line: String) -> bool {
        self.complete(Ok(line))
    }

    /// When the in-flight command times out
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.in_flight.as_ref().and_then(|f| f.deadline)
    }

    /// Fail the in-flight command with a timeout if its deadline has passed
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.deadline().is_some_and(|deadline| deadline <= now) {
            return false;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        let timeout = in_flight.entry.timeout.unwrap_or_default();

        log::warn!(
            "Command {} `{}` got no response within {timeout:?}",
            in_flight.entry.id,
            in_flight.entry.text
        );
        let error = HeadlessError::timeout(in_flight.entry.text.clone(), timeout);
        in_flight.entry.respond(Err(error));
        true
    }

    /// Cancel a queued or in-flight command
    ///
    /// A queued entry is removed without ever being written. An in-flight
    /// entry is resolved early and the slot freed. Returns `false` if the ID is
    /// unknown, e.g. because the command already completed.
    pub fn cancel(&mut self, id: CommandId) -> bool {
        if self.in_flight_id() == Some(id) {
            if let Some(in_flight) = self.in_flight.take() {
                let error = HeadlessError::cancelled(in_flight.entry.text.clone());
                in_flight.entry.respond(Err(error));
            }
            return true;
        }

        match self.pending.iter().position(|entry| entry.id == id) {
            Some(index) => {
                if let Some(entry) = self.pending.remove(index) {
                    let error = HeadlessError::cancelled(entry.text.clone());
                    entry.respond(Err(error));
                }
                true
            }
            None => false,
        }
    }

    /// Fail every entry with `Closed` and leave the queue empty
    pub fn close(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.entry.respond(Err(HeadlessError::Closed));
        }
        for entry in self.pending.drain(..) {
            entry.respond(Err(HeadlessError::Closed));
        }
    }
}
