//! Line transport over a byte stream
//!
//! Wraps one connection half with line-at-a-time reads or writes. Orderly
//! closure surfaces as `Ok(None)` from [`LineReader::next_line`] rather than
//! as an error; [`is_abrupt_disconnect`] tells peer resets apart from other
//! I/O failures so callers can pick log levels and wording.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// Write half type used once a connection is registered. Boxing keeps the
/// registry independent of the concrete stream type.
pub type BoxedWriteHalf = Box<dyn AsyncWrite + Send + Unpin>;

/// Buffered line-at-a-time reader
pub struct LineReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a read half
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
        }
    }

    /// Read the next line with the terminator stripped.
    ///
    /// Returns `Ok(None)` on orderly end of stream. Cancel-safe, so it can
    /// sit in a `select!` arm without losing data.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }
}

/// Line writer that sends each line as a single write
pub struct LineWriter<W> {
    inner: W,
    scratch: BytesMut,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Wrap a write half
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: BytesMut::with_capacity(256),
        }
    }

    /// Write one UTF-8 line; the `\n` terminator is appended here.
    ///
    /// The line is assembled in a scratch buffer so the text and terminator
    /// reach the stream in one write.
    pub async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.scratch.clear();
        self.scratch.reserve(line.len() + 1);
        self.scratch.put_slice(line);
        self.scratch.put_u8(b'\n');

        self.inner.write_all(&self.scratch).await?;
        self.inner.flush().await
    }

    /// Flush and close the write half, signalling end of stream to the peer
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.inner.shutdown().await
    }
}

/// True when the failure means the peer dropped the connection (reset,
/// aborted, or broken pipe) rather than a local I/O problem.
pub fn is_abrupt_disconnect(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
    )
}
