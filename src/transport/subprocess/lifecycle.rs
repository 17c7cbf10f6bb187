//! Lifecycle management for subprocess transport (connect, close)

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::codec::FramedWrite;

use futures::SinkExt;

use crate::error::{HeadlessError, Result};
use crate::transport::codec::ConsoleCodec;

use super::command::CommandBuilder;
use super::config::GRACEFUL_EXIT_TIMEOUT;
use super::transport::SubprocessTransport;

impl SubprocessTransport {
    /// Spawn the headless process and set up stdio pipes
    ///
    /// # Errors
    /// Returns error if process spawning fails or stdio handles cannot be obtained
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.process.is_some() {
            return Ok(());
        }

        let builder = CommandBuilder::new(self.runtime.as_deref(), &self.launch);
        let mut cmd = builder.build();

        let mut child = cmd.spawn().map_err(|e| {
            if !self.launch.headless_path.exists() {
                return HeadlessError::connection(format!(
                    "Headless directory does not exist: {}",
                    self.launch.headless_path.display()
                ));
            }
            HeadlessError::connection(format!("Failed to start headless client: {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HeadlessError::connection("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HeadlessError::connection("Failed to get stdout handle"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HeadlessError::connection("Failed to get stderr handle"))?;

        // Drain stderr so the child never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log::warn!("[headless stderr] {line}");
            }
        });

        log::info!(
            "Started headless client {} (pid {:?})",
            self.launch.executable().display(),
            child.id()
        );

        self.stdin = Some(FramedWrite::new(stdin, ConsoleCodec::new()));
        self.stdout = Some(stdout);
        self.process = Some(child);
        self.stderr_task = Some(stderr_task);

        Ok(())
    }

    /// Close the transport and clean up resources
    ///
    /// # Errors
    /// Returns error if waiting on the process fails
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        // Closing stdin asks the console to exit on its own
        if let Some(mut stdin) = self.stdin.take() {
            let _ = SinkExt::<&str>::close(&mut stdin).await;
        }

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        self.stdout = None;

        if let Some(mut child) = self.process.take() {
            match tokio::time::timeout(GRACEFUL_EXIT_TIMEOUT, child.wait()).await {
                Ok(Ok(status)) => {
                    log::info!("Headless client exited with {status}");
                }
                Ok(Err(e)) => {
                    return Err(HeadlessError::Io(e));
                }
                Err(_) => {
                    log::warn!(
                        "Headless client did not exit within {GRACEFUL_EXIT_TIMEOUT:?}, killing it"
                    );
                    let _ = child.kill().await;
                    let _ = child.wait().await;
                }
            }
        }

        Ok(())
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        self.stdin = None;

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        if let Some(mut child) = self.process.take() {
            let _ = child.start_kill();
        }
    }
}
