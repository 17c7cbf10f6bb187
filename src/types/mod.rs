//! Type definitions for the headless console client
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`, `CommandId`)
//! - [`command`] - Typed console commands and their line templates
//! - [`events`] - Events broadcast to subscribers
//! - [`options`] - Engine configuration options

pub mod command;
pub mod events;
pub mod identifiers;
pub mod options;

// Re-export commonly used types
pub use command::{AccessLevel, ConsoleCommand, WorldRef};
pub use events::{ErrorKind, HeadlessEvent};
pub use identifiers::{CommandId, SESSION_ID_PREFIX, SessionId};
pub use options::{HeadlessOptions, HeadlessOptionsBuilder};
