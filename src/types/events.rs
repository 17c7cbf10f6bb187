//! Events observable by the owner of a client

use serde::Serialize;

use super::identifiers::SessionId;

/// Category of an [`HeadlessEvent::Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The session ID could not be confirmed within the attempt budget
    SessionResolutionExhausted,
    /// The console was driven in a way that breaks correlation
    ProtocolMisuse,
    /// The inbound line stream reported an error
    Stream,
}

/// Event broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// The world is running and its session ID has been resolved
    Ready {
        /// Resolved session ID
        session_id: SessionId,
    },
    /// Raw console line, emitted for every inbound line
    Message {
        /// Line text without its terminator
        line: String,
    },
    /// Recoverable engine error
    Error {
        /// Error category
        kind: ErrorKind,
        /// Human-readable description
        message: String,
    },
    /// The console stream ended or the client was shut down
    Closed,
}

impl HeadlessEvent {
    pub(crate) fn message(line: impl Into<String>) -> Self {
        Self::Message { line: line.into() }
    }

    pub(crate) fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }
}
