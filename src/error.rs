//! Error types for the line streaming loop

use std::io;
use thiserror::Error;

/// Failures seen while streaming lines from a serial device
#[derive(Debug, Error)]
pub enum StreamError {
    /// The port could not be opened (missing, permission denied, busy)
    #[error("failed to open serial port {port}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// The connection failed mid-stream, typically because the device was unplugged
    #[error("failed to read from serial port")]
    Read(#[source] io::Error),

    /// Standard output could not be written
    #[error("failed to write to output")]
    Output(#[source] io::Error),
}

impl StreamError {
    /// Whether the reconnect loop should try again after this error.
    ///
    /// Open and read failures are treated the same way: the port is reopened.
    /// A broken output leaves nowhere to deliver lines.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StreamError::Output(_))
    }
}
