//! Command/response correlation engine
//!
//! - [`queue`] - single-flight FIFO matching responses to commands by position
//! - [`lifecycle`] - startup output classification and prompt echo detection
//! - [`resolver`] - session ID acquisition with bounded retry
//! - [`state`] - engine state shared with client handles
//! - [`messages`] - commands sent from client handles to the engine task

pub mod lifecycle;
pub mod messages;
pub mod queue;
pub mod resolver;
pub mod state;

pub use lifecycle::{Classification, classify, is_prompt_echo};
pub use messages::EngineCommand;
pub use queue::{CommandQueue, Dispatch, EntryKind, QueueEntry, QueueState};
pub use resolver::SESSION_ID_COMMAND;
pub use state::EngineState;
