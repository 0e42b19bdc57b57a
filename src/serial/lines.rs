//! Line assembly on top of a timed-out serial read
//!
//! Serial reads return whatever bytes arrived before the poll interval ran
//! out, so a line can be split across many reads. `LineReader` keeps the
//! unfinished tail between calls and hands back complete lines only.

use std::io::{self, Read};

const READ_CHUNK: usize = 256;

/// Outcome of a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// A complete line, without its terminator
    Line(String),
    /// The read timed out before a full line arrived
    Idle,
    /// The device reported end of stream
    Closed,
}

/// Splits a byte stream into newline-terminated lines
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    chunk: [u8; READ_CHUNK],
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            chunk: [0u8; READ_CHUNK],
        }
    }

    /// Return the next complete line, reading from the device as needed.
    ///
    /// Timeouts yield `Poll::Idle` and keep any partial line buffered. Any
    /// other read error is returned to the caller.
    pub fn poll_line(&mut self) -> io::Result<Poll> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Poll::Line(line));
            }

            match self.inner.read(&mut self.chunk) {
                Ok(0) => return Ok(Poll::Closed),
                Ok(n) => self.pending.extend_from_slice(&self.chunk[..n]),
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => return Ok(Poll::Idle),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }
}

/// Strip trailing whitespace, leaving the rest of the line untouched
pub fn trim_line(line: &str) -> &str {
    line.trim_end()
}
