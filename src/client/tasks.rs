//! Engine task for `HeadlessClient`
//!
//! The engine owns the transport and the command queue. It selects over
//! client commands, inbound console lines and the in-flight deadline, and
//! publishes a state snapshot after every step.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::Shared;
use crate::control::resolver::announce_ready;
use crate::control::{CommandQueue, EngineCommand, EntryKind, classify, is_prompt_echo};
use crate::error::{HeadlessError, Result};
use crate::transport::Transport;
use crate::types::events::{ErrorKind, HeadlessEvent};

pub(super) struct Engine<T: Transport> {
    transport: T,
    queue: CommandQueue,
    shared: Arc<Shared>,
    command_rx: mpsc::UnboundedReceiver<EngineCommand>,
    lines: mpsc::UnboundedReceiver<Result<String>>,
    /// Lets readiness checks send commands without keeping the engine alive
    handle_tx: mpsc::WeakUnboundedSender<EngineCommand>,
}

impl<T: Transport> Engine<T> {
    pub(super) fn new(
        transport: T,
        shared: Arc<Shared>,
        command_rx: mpsc::UnboundedReceiver<EngineCommand>,
        lines: mpsc::UnboundedReceiver<Result<String>>,
        handle_tx: mpsc::WeakUnboundedSender<EngineCommand>,
    ) -> Self {
        Self {
            transport,
            queue: CommandQueue::new(),
            shared,
            command_rx,
            lines,
            handle_tx,
        }
    }

    pub(super) async fn run(mut self) {
        loop {
            let deadline = self.queue.deadline();

            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if self.handle_command(command).await {
                            return;
                        }
                    }
                    None => {
                        log::debug!("All client handles dropped, stopping engine");
                        if let Err(e) = self.shutdown().await {
                            log::warn!("Failed to close transport: {e}");
                        }
                        return;
                    }
                },
                line = self.lines.recv() => match line {
                    Some(Ok(line)) => self.handle_line(line).await,
                    Some(Err(e)) => {
                        log::error!("Console stream error: {e}");
                        self.shared.emit(HeadlessEvent::error(ErrorKind::Stream, e.to_string()));
                    }
                    None => {
                        log::info!("Console output ended");
                        if let Err(e) = self.shutdown().await {
                            log::warn!("Failed to close transport: {e}");
                        }
                        return;
                    }
                },
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.queue.expire(Instant::now()) {
                        self.pump().await;
                    }
                }
            }

            self.publish();
        }
    }

    /// Returns `true` once the engine has shut down
    async fn handle_command(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::Enqueue(entry) => {
                self.queue.push(entry);
                self.pump().await;
            }
            EngineCommand::Cancel { id } => {
                if self.queue.cancel(id) {
                    log::debug!("Cancelled {id}");
                    self.pump().await;
                }
            }
            EngineCommand::ExitLogMode { response_tx } => {
                let result = self.exit_log_mode().await;
                let _ = response_tx.send(result);
            }
            EngineCommand::Shutdown { response_tx } => {
                log::debug!("Shutdown requested");
                let _ = response_tx.send(self.shutdown().await);
                return true;
            }
        }
        false
    }

    async fn handle_line(&mut self, line: String) {
        self.shared.emit(HeadlessEvent::message(line.clone()));

        let classification = {
            let mut state = self.shared.state.write();
            if state.log_mode {
                state.log_lines += 1;
            }
            classify(&line, &mut state)
        };

        if classification.started_running {
            self.spawn_readiness_check();
        }
        if classification.matched {
            return;
        }
        if is_prompt_echo(&line) {
            log::trace!("Prompt echo: {line}");
            return;
        }
        if self.queue.is_paused() {
            return;
        }

        match self.queue.in_flight_id() {
            Some(id) => {
                log::debug!("Response to {id}: {line}");
                self.queue.resolve(line);
                self.pump().await;
            }
            None => log::debug!("Unsolicited console line: {line}"),
        }
    }

    /// Write queued commands until one is awaiting a response or dispatch pauses
    async fn pump(&mut self) {
        while let Some(dispatch) = self.queue.dispatch_next(Instant::now()) {
            log::trace!("Dispatching {}", dispatch.id);

            if let Err(e) = self.transport.write_line(&dispatch.text).await {
                log::error!("Failed to write {}: {e}", dispatch.id);
                self.queue.complete(Err(e));
                continue;
            }

            if dispatch.kind == EntryKind::EnterLogMode {
                self.queue.complete(Ok(String::new()));
                self.queue.pause();
                self.shared.state.write().log_mode = true;
                log::info!("Entered log mode");
            }
        }
    }

    async fn exit_log_mode(&mut self) -> Result<()> {
        if !self.queue.is_paused() {
            let message = "exit_log_mode called while not in log mode";
            log::warn!("{message}");
            self.shared
                .emit(HeadlessEvent::error(ErrorKind::ProtocolMisuse, message));
            return Err(HeadlessError::protocol_misuse(message));
        }

        self.transport.write_line("").await?;
        self.queue.resume();
        self.shared.state.write().log_mode = false;
        log::info!("Left log mode");

        self.pump().await;
        Ok(())
    }

    fn spawn_readiness_check(&self) {
        tokio::spawn(announce_ready(
            Arc::clone(&self.shared),
            self.handle_tx.clone(),
        ));
    }

    fn publish(&self) {
        let mut state = self.shared.state.write();
        state.in_flight = self.queue.in_flight_id().is_some();
        state.queued = self.queue.len();
        state.log_mode = self.queue.is_paused();
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.queue.close();
        {
            let mut state = self.shared.state.write();
            state.closed = true;
            state.in_flight = false;
            state.queued = 0;
        }
        self.shared.emit(HeadlessEvent::Closed);
        self.transport.close().await
    }
}
