//! Transport layer for talking to the headless console
//!
//! A transport moves whole text lines: it writes one command line at a time
//! and yields every inbound line, prompt echoes included. Ordering and
//! correlation are the engine's job, so transports never queue or filter.

pub mod codec;
pub mod pipe;
pub mod reader;
pub mod subprocess;

use tokio::sync::mpsc;

use crate::error::Result;

/// Transport trait for line-oriented console communication
pub trait Transport: Send {
    /// Write one line to the console
    ///
    /// The line is terminated with a single `\n` and flushed immediately.
    ///
    /// # Errors
    /// Returns error if the write fails or the transport is closed
    fn write_line(&mut self, line: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read lines from the console
    ///
    /// Returns a receiver that yields each inbound line with its terminator
    /// stripped. Reading happens on a background task so writes never wait on
    /// reads. The receiver closes when the console output ends.
    fn read_lines(&mut self) -> mpsc::UnboundedReceiver<Result<String>>;

    /// Close the transport and clean up resources
    ///
    /// # Errors
    /// Returns error if cleanup fails
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub use codec::ConsoleCodec;
pub use pipe::PipeTransport;
pub use reader::{PROMPT_IDLE_TIMEOUT, PromptFlush};
pub use subprocess::{LaunchConfig, LaunchConfigBuilder, SubprocessTransport};
