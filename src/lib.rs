//! # Headless Console Client
//!
//! Drive a headless world server through its line-oriented console. The
//! server is scripted only by writing commands to its stdin and reading
//! answers from its stdout; this crate turns that into a typed, async API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use headless_console::{HeadlessClient, HeadlessEvent, HeadlessOptions, LaunchConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HeadlessClient::connect(
//!         LaunchConfig::new("/opt/headless"),
//!         HeadlessOptions::default(),
//!     )
//!     .await?;
//!
//!     let mut events = Box::pin(client.events());
//!     while let Some(event) = events.next().await {
//!         if let HeadlessEvent::Ready { session_id } = event {
//!             log::info!("Ready in {session_id}");
//!             break;
//!         }
//!     }
//!
//!     log::info!("{}", client.users().await?);
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## How responses are matched
//!
//! The console has no request IDs. A command's response is simply the next
//! line the console prints that is neither a prompt echo nor startup output,
//! so commands are written strictly one at a time: the next command is only
//! written once the previous one was answered, timed out or was cancelled.
//!
//! ## Startup
//!
//! While the server boots, its banner lines (`Compatibility Hash: `,
//! `MachineID: `, `World running...`) are recognised and recorded. Once the
//! world runs, the client asks for the session ID, retrying until the answer
//! looks like one, and then emits [`HeadlessEvent::Ready`].
//!
//! ## Architecture
//!
//! - [`types`]: commands, options, events and identifiers
//! - [`client`]: the client handle and its engine task
//! - [`control`]: queue, startup classifier and session resolver
//! - [`transport`]: line transports over pipes or a spawned process
//! - [`error`]: error types and handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, HeadlessError>`](Result):
//!
//! ```no_run
//! # use headless_console::{HeadlessClient, HeadlessError};
//! # async fn example(client: HeadlessClient) {
//! match client.status().await {
//!     Ok(status) => log::info!("{status}"),
//!     Err(HeadlessError::Timeout { command, after }) => {
//!         log::warn!("`{command}` unanswered after {after:?}");
//!     }
//!     Err(e) => log::error!("Error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod control;
pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use client::{HeadlessClient, PendingCommand};
pub use control::EngineState;
pub use error::{HeadlessError, Result};
pub use transport::{LaunchConfig, LaunchConfigBuilder, PipeTransport, SubprocessTransport, Transport};

// Re-export type submodules for flat public API
pub use types::command::{AccessLevel, ConsoleCommand, WorldRef};
pub use types::events::{ErrorKind, HeadlessEvent};
pub use types::identifiers::{CommandId, SessionId};
pub use types::options::{HeadlessOptions, HeadlessOptionsBuilder};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
