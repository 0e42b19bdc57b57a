//! Reconnecting line reader
//!
//! Opens the port, streams lines to the output until the connection fails,
//! then reopens it. The loop ends only when the stop flag is raised, which
//! the process interrupt handler does on Ctrl+C.

use crate::error::StreamError;
use crate::serial::lines::{trim_line, LineReader, Poll};
use crate::serial::port::Connector;
use log::{debug, info, warn};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pause after a failed open before trying again
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Granularity of the stop-aware retry sleep
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Streams lines from a port, reopening it after every failure
pub struct ReconnectingReader<C, W> {
    connector: C,
    port: String,
    out: W,
    stop: Arc<AtomicBool>,
    retry_delay: Duration,
    attempts: u64,
    lines: u64,
}

impl<C: Connector, W: Write> ReconnectingReader<C, W> {
    pub fn new(connector: C, port: impl Into<String>, out: W, stop: Arc<AtomicBool>) -> Self {
        Self {
            connector,
            port: port.into(),
            out,
            stop,
            retry_delay: DEFAULT_RETRY_DELAY,
            attempts: 0,
            lines: 0,
        }
    }

    /// Set the pause taken after a failed open
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Number of connection attempts made so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Run until the stop flag is raised.
    ///
    /// Returns `Ok(())` after writing the stop line. Open and read failures
    /// are retried forever; only a failure to write the output is returned.
    pub fn run(&mut self) -> Result<(), StreamError> {
        while !self.stopped() {
            self.status(&format!("opening {}", self.port))?;
            self.attempts += 1;

            let connection = match self.connector.open(&self.port) {
                Ok(connection) => connection,
                Err(e) => {
                    warn!("{}: {}", e, source_of(&e));
                    self.pause();
                    continue;
                }
            };
            info!("connected to {} (attempt {})", self.port, self.attempts);

            match self.stream(LineReader::new(connection)) {
                Ok(()) => break,
                Err(e) if e.is_retryable() => warn!("{}: {}, reopening", e, source_of(&e)),
                Err(e) => return Err(e),
            }
        }

        self.status("stop")
    }

    /// Copy lines to the output until the connection fails or a stop is requested
    fn stream<R: io::Read>(&mut self, mut reader: LineReader<R>) -> Result<(), StreamError> {
        while !self.stopped() {
            match reader.poll_line() {
                Ok(Poll::Line(line)) => self.emit(trim_line(&line))?,
                Ok(Poll::Idle) => {}
                Ok(Poll::Closed) => {
                    let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "device closed the stream");
                    return Err(StreamError::Read(eof));
                }
                Err(e) => return Err(StreamError::Read(e)),
            }
        }

        debug!("stop requested while connected to {}", self.port);
        Ok(())
    }

    fn emit(&mut self, line: &str) -> Result<(), StreamError> {
        writeln!(self.out, "{}", line).map_err(StreamError::Output)?;
        self.out.flush().map_err(StreamError::Output)?;
        self.lines += 1;
        Ok(())
    }

    fn status(&mut self, message: &str) -> Result<(), StreamError> {
        writeln!(self.out, "> {}", message).map_err(StreamError::Output)?;
        self.out.flush().map_err(StreamError::Output)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Sleep for the retry delay, waking early if a stop is requested
    fn pause(&self) {
        let deadline = Instant::now() + self.retry_delay;
        while !self.stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(STOP_CHECK_INTERVAL.min(deadline - now));
        }
    }
}

fn source_of(err: &StreamError) -> String {
    std::error::Error::source(err)
        .map(|s| s.to_string())
        .unwrap_or_default()
}
