//! `HeadlessClient` implementation
//!
//! This module contains the constructors and the generic public API of
//! `HeadlessClient`: raw command submission, state getters, events and
//! log mode.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::{broadcast, mpsc, oneshot};

use super::pending::PendingCommand;
use super::tasks::Engine;
use super::{HeadlessClient, Shared};
use crate::control::{EngineCommand, EngineState, QueueEntry};
use crate::error::{HeadlessError, Result};
use crate::transport::{LaunchConfig, SubprocessTransport, Transport};
use crate::types::command::{ConsoleCommand, check_single_line};
use crate::types::events::HeadlessEvent;
use crate::types::identifiers::SessionId;
use crate::types::options::HeadlessOptions;

impl HeadlessClient {
    /// Launch the headless executable and attach a client to it
    ///
    /// # Arguments
    /// * `launch` - Where the headless client is installed and how to start it
    /// * `options` - Engine options
    ///
    /// # Errors
    /// Returns `InvalidConfig` for unusable options, or an error if the
    /// runtime cannot be found or the process fails to start
    pub async fn connect(launch: LaunchConfig, options: HeadlessOptions) -> Result<Self> {
        options.validate()?;
        let mut transport =
            SubprocessTransport::new(launch)?.with_max_line_length(options.max_line_length);
        transport.connect().await?;

        log::info!(
            "Launched headless client (pid {})",
            transport
                .pid()
                .map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
        );

        Self::with_transport(transport, options)
    }

    /// Attach a client to an already connected transport
    ///
    /// Spawns the engine task, so this must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the options fail [`HeadlessOptions::validate`]
    pub fn with_transport<T>(mut transport: T, options: HeadlessOptions) -> Result<Self>
    where
        T: Transport + 'static,
    {
        options.validate()?;
        let lines = transport.read_lines();
        let shared = Arc::new(Shared::new(options));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let engine = Engine::new(
            transport,
            Arc::clone(&shared),
            command_rx,
            lines,
            command_tx.downgrade(),
        );
        tokio::spawn(engine.run());

        Ok(Self { command_tx, shared })
    }

    /// Queue a raw command line using the default timeout
    ///
    /// The command is written once every earlier command has been answered.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the text contains a line break
    pub fn submit(&self, text: impl Into<String>) -> Result<PendingCommand> {
        self.submit_with_timeout(text, self.shared.options.command_timeout)
    }

    /// Queue a raw command line with an explicit timeout
    ///
    /// `None` waits for the response indefinitely. The timeout starts when the
    /// command is written, not when it is queued.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the text contains a line break
    pub fn submit_with_timeout(
        &self,
        text: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<PendingCommand> {
        let text = text.into();
        check_single_line(&text)?;

        let id = self.shared.next_command_id();
        let (tx, rx) = oneshot::channel();
        let entry = QueueEntry::command(id, text.clone(), timeout, tx);

        // A stopped engine drops the entry, so the handle resolves with `Closed`
        if self.command_tx.send(EngineCommand::Enqueue(entry)).is_err() {
            log::debug!("Command {id} submitted after the engine stopped");
        }

        Ok(PendingCommand::new(id, text, rx, self.command_tx.clone()))
    }

    /// Run a raw command line and wait for its response
    ///
    /// # Errors
    /// Returns error if the text is invalid, the command times out, is
    /// cancelled or the console closes first
    pub async fn run_command(&self, text: impl Into<String>) -> Result<String> {
        self.submit(text)?.await
    }

    /// Run a raw command line with an explicit timeout
    ///
    /// # Errors
    /// Returns error if the text is invalid, the command times out, is
    /// cancelled or the console closes first
    pub async fn run_command_with_timeout(
        &self,
        text: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<String> {
        self.submit_with_timeout(text, timeout)?.await
    }

    /// Run a typed command and wait for its response
    ///
    /// # Errors
    /// Returns `InvalidArgument` before anything is written if an argument
    /// breaks the quoting rules, otherwise as [`run_command`](Self::run_command)
    pub async fn execute(&self, command: ConsoleCommand) -> Result<String> {
        self.run_command(command.to_line()?).await
    }

    /// Snapshot of the engine state
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.state.read().clone()
    }

    /// Whether the startup banner announced a running world
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.read().running
    }

    /// Whether the console is still starting up
    #[must_use]
    pub fn is_starting(&self) -> bool {
        self.shared.state.read().starting
    }

    /// Whether the world runs and its session ID is known
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.state.read().ready
    }

    /// Compatibility hash printed at startup
    #[must_use]
    pub fn compatibility_hash(&self) -> Option<String> {
        self.shared.state.read().compatibility_hash.clone()
    }

    /// Machine ID printed at startup
    #[must_use]
    pub fn machine_id(&self) -> Option<String> {
        self.shared.state.read().machine_id.clone()
    }

    /// Session ID if one has been resolved
    #[must_use]
    pub fn cached_session_id(&self) -> Option<SessionId> {
        self.shared.state.read().session_id.clone()
    }

    /// Rejected session ID responses in the current resolution cycle
    #[must_use]
    pub fn session_id_attempts(&self) -> u32 {
        self.shared.state.read().session_id_attempts
    }

    /// Whether a command submitted now would be written immediately
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.shared.state.read().can_send()
    }

    /// Whether dispatch is suspended for log mode
    #[must_use]
    pub fn is_log_mode(&self) -> bool {
        self.shared.state.read().log_mode
    }

    /// Whether the engine has stopped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.read().closed
    }

    /// Options the client was created with
    #[must_use]
    pub fn options(&self) -> &HeadlessOptions {
        &self.shared.options
    }

    /// Subscribe to events emitted from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HeadlessEvent> {
        self.shared.events.subscribe()
    }

    /// Take the receiver created together with the client
    ///
    /// Unlike [`subscribe`](Self::subscribe) it also holds the events emitted
    /// before the caller got hold of the client, up to the channel capacity.
    /// Returns `None` once taken.
    pub fn take_event_receiver(&self) -> Option<broadcast::Receiver<HeadlessEvent>> {
        self.shared.initial_events.lock().take()
    }

    /// Stream of events, ending after `Closed`
    ///
    /// Uses the initial receiver when it has not been taken yet, otherwise a
    /// fresh subscription. Events lost to a slow consumer are skipped with a
    /// warning.
    pub fn events(&self) -> impl Stream<Item = HeadlessEvent> + Send + 'static {
        let mut rx = self.take_event_receiver().unwrap_or_else(|| self.subscribe());

        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(HeadlessEvent::Closed) => {
                        yield HeadlessEvent::Closed;
                        break;
                    }
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Event stream lagged, skipped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Queue the `log` command
    ///
    /// Once it is written, dispatch pauses and every console line is treated
    /// as log output until [`exit_log_mode`](Self::exit_log_mode). Commands
    /// submitted meanwhile wait in the queue.
    ///
    /// # Errors
    /// Returns error if writing fails or the console closes first
    pub async fn enter_log_mode(&self) -> Result<()> {
        let id = self.shared.next_command_id();
        let (tx, rx) = oneshot::channel();

        if self
            .command_tx
            .send(EngineCommand::Enqueue(QueueEntry::log_mode(id, tx)))
            .is_err()
        {
            return Err(HeadlessError::Closed);
        }

        rx.await.map_err(|_| HeadlessError::Closed)?.map(drop)
    }

    /// Leave log mode and resume dispatch
    ///
    /// # Errors
    /// Returns `ProtocolMisuse` if the console is not in log mode, or a
    /// transport error if the line cannot be written
    pub async fn exit_log_mode(&self) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        if self
            .command_tx
            .send(EngineCommand::ExitLogMode { response_tx })
            .is_err()
        {
            return Err(HeadlessError::Closed);
        }

        response_rx.await.map_err(|_| HeadlessError::Closed)?
    }

    /// Stop the engine and close the transport
    ///
    /// Every queued and in-flight command resolves with `Closed`. Closing an
    /// already stopped client succeeds.
    ///
    /// # Errors
    /// Returns error if the transport fails to close cleanly
    pub async fn close(&self) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();

        if self
            .command_tx
            .send(EngineCommand::Shutdown { response_tx })
            .is_err()
        {
            return Ok(());
        }

        response_rx.await.unwrap_or(Ok(()))
    }
}
