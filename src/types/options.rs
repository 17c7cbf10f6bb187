//! Engine options and configuration
//!
//! Options are supplied once at construction and never change afterwards.

use std::time::Duration;

use crate::error::{HeadlessError, Result};

/// Default delay callers may wait after readiness before trusting the world
pub const DEFAULT_SAFE_READY_DELAY: Duration = Duration::from_millis(1000);

/// Default number of rejected `sessionId` responses tolerated per cycle
pub const DEFAULT_SESSION_ID_MAX_ATTEMPTS: u32 = 15;

/// Default pause between session ID attempts
pub const DEFAULT_SESSION_ID_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Default time a dispatched command may wait for its response
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Default maximum console line length (1MB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

// ============================================================================
// Headless Options
// ============================================================================

/// Options for the command engine
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Delay a caller may apply after `Ready` before trusting the world.
    ///
    /// Carried through for callers; the engine never waits on it.
    pub safe_ready_delay: Duration,
    /// Caller-defined switch for event consumers. Carried through unchanged.
    pub events_enabled: bool,
    /// Rejected `sessionId` responses tolerated before giving up
    pub session_id_max_attempts: u32,
    /// Pause between two `sessionId` attempts
    pub session_id_retry_delay: Duration,
    /// Response timeout for dispatched commands, `None` waits forever
    pub command_timeout: Option<Duration>,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
    /// Maximum accepted length of one inbound console line
    pub max_line_length: usize,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            safe_ready_delay: DEFAULT_SAFE_READY_DELAY,
            events_enabled: false,
            session_id_max_attempts: DEFAULT_SESSION_ID_MAX_ATTEMPTS,
            session_id_retry_delay: DEFAULT_SESSION_ID_RETRY_DELAY,
            command_timeout: Some(DEFAULT_COMMAND_TIMEOUT),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl HeadlessOptions {
    /// Create a new builder for `HeadlessOptions`
    #[must_use]
    pub fn builder() -> HeadlessOptionsBuilder {
        HeadlessOptionsBuilder::default()
    }

    /// Check the options before a client is built from them
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `event_capacity` or `max_line_length` is
    /// zero
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(HeadlessError::invalid_config(
                "event_capacity must be greater than zero",
            ));
        }
        if self.max_line_length == 0 {
            return Err(HeadlessError::invalid_config(
                "max_line_length must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder for HeadlessOptions
// ============================================================================

/// Builder for `HeadlessOptions`
#[derive(Debug, Default)]
pub struct HeadlessOptionsBuilder {
    options: HeadlessOptions,
}

impl HeadlessOptionsBuilder {
    /// Set the safe ready delay
    #[must_use]
    pub const fn safe_ready_delay(mut self, delay: Duration) -> Self {
        self.options.safe_ready_delay = delay;
        self
    }

    /// Set the events flag
    #[must_use]
    pub const fn events_enabled(mut self, enabled: bool) -> Self {
        self.options.events_enabled = enabled;
        self
    }

    /// Set the session ID attempt budget
    #[must_use]
    pub const fn session_id_max_attempts(mut self, attempts: u32) -> Self {
        self.options.session_id_max_attempts = attempts;
        self
    }

    /// Set the delay between session ID attempts
    #[must_use]
    pub const fn session_id_retry_delay(mut self, delay: Duration) -> Self {
        self.options.session_id_retry_delay = delay;
        self
    }

    /// Set the default command timeout (`None` disables it)
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.command_timeout = timeout;
        self
    }

    /// Set the event channel capacity
    #[must_use]
    pub const fn event_capacity(mut self, capacity: usize) -> Self {
        self.options.event_capacity = capacity;
        self
    }

    /// Set the maximum inbound line length
    #[must_use]
    pub const fn max_line_length(mut self, max: usize) -> Self {
        self.options.max_line_length = max;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> HeadlessOptions {
        self.options
    }
}
