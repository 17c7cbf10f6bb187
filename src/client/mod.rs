//! `HeadlessClient` for driving a headless console
//!
//! This module provides the client handle that turns typed calls into console
//! lines and resolves each call with the line the console answers with,
//! including support for:
//! - Single-flight command dispatch in submission order
//! - Per-command timeouts and cancellation
//! - Startup tracking and session ID resolution
//! - Log mode
//!
//! # Architecture
//!
//! Every client owns one engine task. Handles are cheap clones that talk to
//! the engine over a channel; the engine is the only writer to the console:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HeadlessClient (clone) ──┐                              │
//! │  HeadlessClient (clone) ──┼── EngineCommand ──▶ Engine   │
//! │  PendingCommand ──────────┘                     │  ▲     │
//! │                                     write_line  │  │ lines
//! │                                                 ▼  │     │
//! │                                              Transport   │
//! │                                                          │
//! │  Shared: RwLock<EngineState> + broadcast<HeadlessEvent>  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine stops when `close()` is called, when the console output ends,
//! or when the last handle is dropped.
//!
//! # Example: Basic Usage
//!
//! ```no_run
//! use headless_console::{HeadlessClient, HeadlessOptions, LaunchConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let launch = LaunchConfig::new("/opt/headless");
//! let client = HeadlessClient::connect(launch, HeadlessOptions::default()).await?;
//!
//! let mut events = client.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if matches!(event, headless_console::HeadlessEvent::Ready { .. }) {
//!         break;
//!     }
//! }
//!
//! let status = client.status().await?;
//! println!("{status}");
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Cancelling a Command
//!
//! ```no_run
//! use headless_console::{HeadlessClient, HeadlessOptions, LaunchConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HeadlessClient::connect(LaunchConfig::new("/opt/headless"), HeadlessOptions::default()).await?;
//!
//! let pending = client.submit("users")?;
//! pending.cancel();
//! assert!(pending.await.is_err());
//! # Ok(())
//! # }
//! ```

mod client_impl;
mod commands;
mod pending;
mod tasks;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};

use crate::control::{EngineCommand, EngineState};
use crate::types::events::HeadlessEvent;
use crate::types::identifiers::CommandId;
use crate::types::options::HeadlessOptions;

pub use pending::PendingCommand;

/// State shared between client handles and the engine task
pub(crate) struct Shared {
    /// Engine state snapshot
    pub(crate) state: RwLock<EngineState>,
    /// Event fan-out
    events: broadcast::Sender<HeadlessEvent>,
    /// Receiver created with the channel so startup events are not lost
    initial_events: Mutex<Option<broadcast::Receiver<HeadlessEvent>>>,
    /// Options the client was created with
    pub(crate) options: HeadlessOptions,
    /// Serializes session ID resolution cycles
    pub(crate) resolver_lock: tokio::sync::Mutex<()>,
    next_command_id: AtomicU64,
}

impl Shared {
    fn new(options: HeadlessOptions) -> Self {
        let (events, initial) = broadcast::channel(options.event_capacity);
        Self {
            state: RwLock::new(EngineState::default()),
            events,
            initial_events: Mutex::new(Some(initial)),
            options,
            resolver_lock: tokio::sync::Mutex::new(()),
            next_command_id: AtomicU64::new(1),
        }
    }

    /// Broadcast an event; having no subscribers is fine
    pub(crate) fn emit(&self, event: HeadlessEvent) {
        let _ = self.events.send(event);
    }

    fn next_command_id(&self) -> CommandId {
        CommandId::new(self.next_command_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Client for a headless console
///
/// `HeadlessClient` serializes commands onto the console one at a time and
/// resolves each with the next non-prompt line the console prints. Clones
/// share the same engine.
///
/// # Examples
///
/// ```no_run
/// use headless_console::{HeadlessClient, HeadlessOptions, LaunchConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HeadlessClient::connect(
///         LaunchConfig::new("/opt/headless"),
///         HeadlessOptions::default(),
///     )
///     .await?;
///
///     client.login("bot", "hunter2").await?;
///     let invited = client.invite("friend").await?;
///     println!("{invited}");
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct HeadlessClient {
    /// Channel to the engine task
    command_tx: mpsc::UnboundedSender<EngineCommand>,
    /// State and events shared with the engine task
    pub(crate) shared: Arc<Shared>,
}

impl HeadlessClient {
    /// Rebuild a handle from a weak sender, `None` once every handle is gone
    pub(crate) fn upgrade(
        handle_tx: &mpsc::WeakUnboundedSender<EngineCommand>,
        shared: &Arc<Shared>,
    ) -> Option<Self> {
        handle_tx.upgrade().map(|command_tx| Self {
            command_tx,
            shared: Arc::clone(shared),
        })
    }
}

impl std::fmt::Debug for HeadlessClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessClient")
            .field("state", &*self.shared.state.read())
            .finish_non_exhaustive()
    }
}
