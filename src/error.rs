//! Error types for the headless console client

use std::time::Duration;

use thiserror::Error;

/// Main error type for the headless console client
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Runtime used to launch the headless executable was not found
    #[error("Runtime not found: {0}")]
    RuntimeNotFound(String),

    /// Connection error when starting or attaching to the headless process
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A command argument cannot be expressed on the console line
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The console was driven in a way that breaks response correlation
    #[error("Protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// A dispatched command received no response in time
    #[error("Command `{command}` timed out after {after:?}")]
    Timeout {
        /// Command text that stalled
        command: String,
        /// Timeout that expired
        after: Duration,
    },

    /// The command was cancelled before a response arrived
    #[error("Command `{0}` was cancelled")]
    Cancelled(String),

    /// The engine stopped (stream closed or client shut down)
    #[error("Headless console is closed")]
    Closed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for headless console operations
pub type Result<T> = std::result::Result<T, HeadlessError>;

impl HeadlessError {
    /// Create a runtime not found error
    pub fn runtime_not_found(runtime: impl AsRef<str>) -> Self {
        Self::RuntimeNotFound(format!(
            "`{}` is required to run the headless client on this platform. \
             Install it or set an explicit runtime path in the launch config",
            runtime.as_ref()
        ))
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a protocol misuse error
    pub fn protocol_misuse(msg: impl Into<String>) -> Self {
        Self::ProtocolMisuse(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(command: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            after,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(command: impl Into<String>) -> Self {
        Self::Cancelled(command.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether retrying the same command later can reasonably succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Cancelled(_) | Self::Transport(_) | Self::Io(_)
        )
    }
}
