//! Line reading logic shared by all transports

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;

use crate::error::Result;

use super::codec::ConsoleCodec;

/// How long the console must stay quiet before a buffered prompt is released
///
/// A fragment ending in `>` is only released after at least one full window
/// without new bytes, and at the latest after two.
pub const PROMPT_IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Asks a line reader to release a buffered prompt right away
///
/// Transports request a flush before writing a command: the console prints
/// its prompt before reading input, so whatever prompt is buffered at that
/// point cannot be the start of the coming response.
#[derive(Debug, Clone, Default)]
pub struct PromptFlush(Arc<Notify>);

impl PromptFlush {
    /// Request a flush; requests made while the reader is busy are kept
    pub fn request(&self) {
        self.0.notify_one();
    }
}

/// Spawn a background task reading console lines from `reader`
///
/// Every decoded line is forwarded to the returned receiver. A prompt printed
/// without a newline is forwarded as its own line once `flush` is requested
/// or the console has been idle for [`PROMPT_IDLE_TIMEOUT`]. The task stops
/// at EOF, after the first read error (which is forwarded), or once the
/// receiver is dropped.
pub fn spawn_line_reader<R>(
    reader: R,
    max_line_length: usize,
    flush: PromptFlush,
) -> (mpsc::UnboundedReceiver<Result<String>>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut framed = FramedRead::new(reader, ConsoleCodec::with_max_length(max_line_length));
        // Buffered length seen at the previous idle tick
        let mut idle_len = None;

        loop {
            let item = tokio::select! {
                biased;
                next = framed.next() => match next {
                    Some(item) => {
                        idle_len = None;
                        item
                    }
                    None => break,
                },
                () = flush.0.notified() => match release_prompt(&mut framed) {
                    Some(prompt) => Ok(prompt),
                    None => continue,
                },
                () = tokio::time::sleep(PROMPT_IDLE_TIMEOUT) => {
                    let buffered = framed.read_buffer().len();
                    if buffered == 0 || idle_len != Some(buffered) {
                        idle_len = (buffered > 0).then_some(buffered);
                        continue;
                    }
                    idle_len = None;
                    match release_prompt(&mut framed) {
                        Some(prompt) => Ok(prompt),
                        None => continue,
                    }
                }
            };

            match item {
                Ok(line) => {
                    log::debug!("<< {line}");
                    if tx.send(Ok(line)).is_err() {
                        // Receiver dropped, stop reading
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Console read failed: {e}");
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }

        log::debug!("Console output ended");
    });

    (rx, task)
}

fn release_prompt<R>(framed: &mut FramedRead<R, ConsoleCodec>) -> Option<String> {
    let mut buffered = std::mem::take(framed.read_buffer_mut());
    let prompt = framed.decoder_mut().take_prompt(&mut buffered);
    *framed.read_buffer_mut() = buffered;
    prompt
}
