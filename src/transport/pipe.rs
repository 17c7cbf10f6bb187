//! Transport over an arbitrary reader/writer pair
//!
//! Used to attach to a console whose process is owned elsewhere, and by the
//! test suite with `tokio::io::duplex`.

use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;

use crate::error::{HeadlessError, Result};
use crate::types::options::DEFAULT_MAX_LINE_LENGTH;

use super::Transport;
use super::codec::ConsoleCodec;
use super::reader::{PromptFlush, spawn_line_reader};

/// Console transport over existing pipes
pub struct PipeTransport<R, W> {
    reader: Option<R>,
    writer: Option<FramedWrite<W, ConsoleCodec>>,
    reader_task: Option<JoinHandle<()>>,
    prompt_flush: PromptFlush,
    max_line_length: usize,
}

impl<R, W> PipeTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a transport reading console output from `reader` and writing
    /// commands to `writer`
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(FramedWrite::new(writer, ConsoleCodec::new())),
            reader_task: None,
            prompt_flush: PromptFlush::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Override the maximum inbound line length
    #[must_use]
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

impl<R, W> Transport for PipeTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
{
    async fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| HeadlessError::transport("writer is closed"))?;

        log::debug!(">> {line}");
        self.prompt_flush.request();
        writer.send(line).await
    }

    fn read_lines(&mut self) -> mpsc::UnboundedReceiver<Result<String>> {
        let Some(reader) = self.reader.take() else {
            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(Err(HeadlessError::transport(
                "console output is already being read",
            )));
            return rx;
        };

        let (rx, task) = spawn_line_reader(reader, self.max_line_length, self.prompt_flush.clone());
        self.reader_task = Some(task);
        rx
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if let Some(mut writer) = self.writer.take() {
            SinkExt::<&str>::close(&mut writer).await?;
        }
        Ok(())
    }
}

impl<R, W> Drop for PipeTransport<R, W> {
    fn drop(&mut self) {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}
