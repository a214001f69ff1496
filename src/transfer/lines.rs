//! Line-oriented copy used by text-mode transfers.
//!
//! Every line read from the source is written to the sink followed by
//! exactly one CRLF, whatever terminator (LF, CRLF or none at end of
//! stream) the source used. Lines are handled in bounded segments, so a
//! source without newlines never has to fit in memory.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

const CRLF: &[u8] = b"\r\n";

/// Upper bound on the bytes carried by one [`Segment`].
pub const SEGMENT_SIZE: usize = 8 * 1024;

/// A piece of one source line, terminator stripped.
#[derive(Debug, PartialEq)]
pub struct Segment {
    pub content: Vec<u8>,
    /// The line continues in the next segment, or ended at end of stream
    /// without a terminator
    pub is_prefix: bool,
}

/// Reads lines from a buffered source as `(segment, is_prefix)` pieces.
pub struct LineReader<R> {
    inner: R,
    /// A carriage return ended the previous segment; whether it belongs to
    /// a CRLF depends on the next byte
    pending_cr: bool,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending_cr: false,
        }
    }

    /// Returns the next segment, or `None` once the source is exhausted.
    pub async fn next_segment(&mut self) -> io::Result<Option<Segment>> {
        let buf = self.inner.fill_buf().await?;
        if buf.is_empty() {
            if std::mem::take(&mut self.pending_cr) {
                return Ok(Some(Segment {
                    content: vec![b'\r'],
                    is_prefix: true,
                }));
            }
            return Ok(None);
        }

        let window = &buf[..buf.len().min(SEGMENT_SIZE)];
        let (end, used, is_prefix) = match window.iter().position(|&b| b == b'\n') {
            Some(i) => (i, i + 1, false),
            None => (window.len(), window.len(), true),
        };

        let mut content = Vec::with_capacity(end + 1);
        // A held carriage return directly before the newline is the CR of a CRLF
        if std::mem::take(&mut self.pending_cr) && (is_prefix || end > 0) {
            content.push(b'\r');
        }
        content.extend_from_slice(&window[..end]);
        self.inner.consume(used);

        if content.last() == Some(&b'\r') {
            content.pop();
            self.pending_cr = is_prefix;
        }

        Ok(Some(Segment { content, is_prefix }))
    }
}

/// Copies `reader` into `writer`, rewriting every line ending as CRLF.
///
/// Returns the number of bytes written to `writer`.
pub async fn copy_lines_crlf<R, W>(reader: R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = LineReader::new(reader);
    let mut out = BufWriter::new(writer);
    let mut written = 0u64;
    let mut open_line = false;

    while let Some(segment) = lines.next_segment().await? {
        out.write_all(&segment.content).await?;
        written += segment.content.len() as u64;

        open_line = segment.is_prefix;
        if !open_line {
            out.write_all(CRLF).await?;
            written += CRLF.len() as u64;
        }
    }

    if open_line {
        out.write_all(CRLF).await?;
        written += CRLF.len() as u64;
    }

    out.flush().await?;
    Ok(written)
}
