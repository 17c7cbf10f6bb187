//! Subprocess transport for the headless executable

use std::path::PathBuf;
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;

use futures::SinkExt;

use crate::Transport;
use crate::error::{HeadlessError, Result};
use crate::transport::codec::ConsoleCodec;
use crate::transport::reader::{PromptFlush, spawn_line_reader};
use crate::types::options::DEFAULT_MAX_LINE_LENGTH;

use super::config::{DEFAULT_RUNTIME, LaunchConfig};

/// Subprocess transport for the headless client
pub struct SubprocessTransport {
    pub(super) launch: LaunchConfig,
    pub(super) runtime: Option<PathBuf>,
    pub(super) process: Option<Child>,
    pub(super) stdin: Option<FramedWrite<ChildStdin, ConsoleCodec>>,
    pub(super) stdout: Option<ChildStdout>,
    pub(super) max_line_length: usize,
    pub(super) reader_task: Option<JoinHandle<()>>,
    pub(super) prompt_flush: PromptFlush,
    pub(super) stderr_task: Option<JoinHandle<()>>,
}

impl SubprocessTransport {
    /// Create a new subprocess transport
    ///
    /// The process is not started until [`SubprocessTransport::connect`].
    ///
    /// # Errors
    /// Returns error if no runtime is configured and `mono` cannot be found
    /// on a platform that needs it
    pub fn new(launch: LaunchConfig) -> Result<Self> {
        let runtime = match launch.runtime.clone() {
            Some(runtime) => Some(runtime),
            None => Self::find_runtime()?,
        };

        Ok(Self {
            launch,
            runtime,
            process: None,
            stdin: None,
            stdout: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            reader_task: None,
            prompt_flush: PromptFlush::default(),
            stderr_task: None,
        })
    }

    /// Override the maximum inbound line length
    #[must_use]
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Find the runtime hosting the executable
    ///
    /// Windows runs the executable directly, everything else goes through
    /// `mono`.
    ///
    /// # Errors
    /// Returns error if `mono` is needed but not in `PATH`
    pub fn find_runtime() -> Result<Option<PathBuf>> {
        if cfg!(windows) {
            return Ok(None);
        }

        which::which(DEFAULT_RUNTIME)
            .map(Some)
            .map_err(|_| HeadlessError::runtime_not_found(DEFAULT_RUNTIME))
    }

    /// Start the headless process
    ///
    /// # Errors
    /// Returns error if the process cannot be spawned
    pub async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    /// Launch settings of this transport
    #[must_use]
    pub fn launch_config(&self) -> &LaunchConfig {
        &self.launch
    }

    /// OS process id, if the process is running
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(Child::id)
    }
}

impl Transport for SubprocessTransport {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| HeadlessError::transport("stdin not available"))?;

        log::debug!(">> {line}");
        self.prompt_flush.request();
        stdin
            .send(line)
            .await
            .map_err(|e| HeadlessError::transport(format!("Failed to write to stdin: {e}")))
    }

    fn read_lines(&mut self) -> mpsc::UnboundedReceiver<Result<String>> {
        let Some(stdout) = self.stdout.take() else {
            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(Err(HeadlessError::connection(
                "Not connected - stdout not available",
            )));
            return rx;
        };

        let (rx, task) = spawn_line_reader(stdout, self.max_line_length, self.prompt_flush.clone());
        self.reader_task = Some(task);
        rx
    }

    async fn close(&mut self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for SubprocessTransport {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
