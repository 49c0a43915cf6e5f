use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::process::ProbeOutput;

/// Reads `reader` line by line on a background task, forwarding each line.
///
/// The task ends on EOF, on a read error, or once the receiver is dropped.
pub fn spawn_line_producer<R>(reader: R) -> (mpsc::UnboundedReceiver<String>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (line_tx, line_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut lines = 0u64;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_newline(&buf)).into_owned();
                    if line_tx.send(line).is_err() {
                        break;
                    }
                    lines += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "probe output read failed");
                    break;
                }
            }
        }
        tracing::trace!(lines, "line producer finished");
    });

    (line_rx, handle)
}

impl ProbeOutput {
    pub fn spawn_producer(self) -> (mpsc::UnboundedReceiver<String>, JoinHandle<()>) {
        match self {
            Self::Stdout(out) => spawn_line_producer(out),
            Self::Stderr(err) => spawn_line_producer(err),
        }
    }
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
