//! Handle for a submitted command

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::control::EngineCommand;
use crate::error::{HeadlessError, Result};
use crate::types::identifiers::CommandId;

/// A command that has been queued and will resolve with its response line
///
/// Awaiting the handle yields the response. Dropping it does not withdraw the
/// command, which still occupies its place in the queue; use
/// [`cancel`](Self::cancel) for that.
#[derive(Debug)]
#[must_use = "the response is only observable by awaiting the command"]
pub struct PendingCommand {
    id: CommandId,
    text: String,
    rx: oneshot::Receiver<Result<String>>,
    command_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl PendingCommand {
    pub(super) fn new(
        id: CommandId,
        text: String,
        rx: oneshot::Receiver<Result<String>>,
        command_tx: mpsc::UnboundedSender<EngineCommand>,
    ) -> Self {
        Self {
            id,
            text,
            rx,
            command_tx,
        }
    }

    /// Command ID
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Line written (or to be written) to the console
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Withdraw the command
    ///
    /// A command still waiting in the queue is removed without being written.
    /// An in-flight command resolves with `Cancelled` and the queue moves on;
    /// its response line, if the console still prints one, is not tracked.
    /// Has no effect once the command has completed.
    pub fn cancel(&self) {
        if self
            .command_tx
            .send(EngineCommand::Cancel { id: self.id })
            .is_err()
        {
            log::debug!("Cancel of {} ignored, engine stopped", self.id);
        }
    }
}

impl Future for PendingCommand {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(HeadlessError::Closed)))
    }
}
