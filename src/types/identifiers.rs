//! Newtype wrappers for type safety

use serde::{Deserialize, Serialize};

/// Prefix every canonical session identifier carries
pub const SESSION_ID_PREFIX: &str = "S-";

/// Session ID newtype for type safety
///
/// Only console responses starting with [`SESSION_ID_PREFIX`] are accepted as
/// session identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a console response into a session ID
    ///
    /// Returns `None` unless the response starts with `S-`.
    #[must_use]
    pub fn parse(response: &str) -> Option<Self> {
        let candidate = response.trim_end();
        candidate
            .starts_with(SESSION_ID_PREFIX)
            .then(|| Self(candidate.to_string()))
    }

    /// Get the session ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier assigned to each queued command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl CommandId {
    /// Create a command ID from its sequence number
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Sequence number of the command
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cmd-{}", self.0)
    }
}
