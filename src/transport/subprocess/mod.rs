//! Subprocess transport for the headless client
//!
//! Spawns the headless executable (through `mono` outside Windows) and talks
//! to its console via stdin/stdout.

mod command;
mod config;
mod lifecycle;
mod transport;

// Re-export public types
pub use command::CommandBuilder;
pub use config::{
    DEFAULT_CONFIG_FILE, DEFAULT_RUNTIME, GRACEFUL_EXIT_TIMEOUT, HEADLESS_EXECUTABLE,
    LaunchConfig, LaunchConfigBuilder,
};
pub use transport::SubprocessTransport;
