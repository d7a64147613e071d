//! Line-oriented multiplexing of a child process's output streams.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Which stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSource {
    /// Standard output.
    Stdout,

    /// Standard error.
    Stderr,
}

/// One line of process output, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// Stream the line came from.
    pub source: OutputSource,

    /// Line content.
    pub text: String,
}

impl OutputLine {
    /// Create a line tagged with its source.
    pub fn new(source: OutputSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Capacity of the fan-in channel between the stream readers and the sink.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Read `stdout` and `stderr` line-by-line and deliver every line to `on_line`.
///
/// One reader task runs per stream; both fan into a single channel consumed
/// here, so the sink is invoked from exactly one place and never concurrently.
/// Lines from the same stream arrive in emission order. Interleaving BETWEEN
/// the two streams is timing-dependent and deliberately unspecified; callers
/// must not rely on cross-stream ordering.
///
/// Returns only after both streams reached end-of-file (or errored) and every
/// buffered line was delivered.
pub async fn multiplex_lines<O, E, F>(stdout: O, stderr: E, mut on_line: F)
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
    F: FnMut(OutputLine),
{
    let (tx, mut rx) = mpsc::channel::<OutputLine>(LINE_CHANNEL_CAPACITY);

    let stdout_reader = tokio::spawn(read_lines(stdout, OutputSource::Stdout, tx.clone()));
    let stderr_reader = tokio::spawn(read_lines(stderr, OutputSource::Stderr, tx));

    // The channel closes once both reader tasks dropped their senders, so this
    // loop is the join barrier for the pair.
    while let Some(line) = rx.recv().await {
        on_line(line);
    }

    let _ = stdout_reader.await;
    let _ = stderr_reader.await;
}

/// Scan one stream line-by-line, forwarding each line tagged with `source`.
///
/// Terminates at end-of-file or on the first read error.
async fn read_lines<R>(stream: R, source: OutputSource, tx: mpsc::Sender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(text)) => {
                if tx.send(OutputLine::new(source, text)).await.is_err() {
                    // Receiver gone; nothing left to deliver to.
                    break;
                }
            }
            Ok(None) => break, // EOF
            Err(e) => {
                warn!(source = ?source, "Error reading stream: {}", e);
                break;
            }
        }
    }
}
