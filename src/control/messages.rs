//! Messages from client handles to the engine task

use tokio::sync::oneshot;

use crate::error::Result;
use crate::types::identifiers::CommandId;

use super::queue::QueueEntry;

/// Commands that can be sent to the engine task
///
/// Client handles never touch the queue or the transport directly; every
/// mutation travels through this channel so the engine task stays the only
/// writer to the console.
#[derive(Debug)]
pub enum EngineCommand {
    /// Append an entry to the command queue
    Enqueue(QueueEntry),

    /// Cancel a queued or in-flight command
    Cancel {
        /// Command to cancel
        id: CommandId,
    },

    /// Leave log mode and resume dispatch
    ExitLogMode {
        /// Channel to send the operation result back
        response_tx: oneshot::Sender<Result<()>>,
    },

    /// Fail pending commands, close the transport and stop
    Shutdown {
        /// Channel to send the shutdown confirmation back
        response_tx: oneshot::Sender<Result<()>>,
    },
}
