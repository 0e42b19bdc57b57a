//! Serial port configuration and connection management
//!
//! Opens the device at the fixed line settings behind the `Connector` seam
//! the reconnect loop uses.

use crate::error::StreamError;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read};
use std::time::Duration;

/// Device opened when no port is given on the command line
pub const DEFAULT_PORT: &str = "/dev/ttyUSB3";

/// Fixed baud rate of the link
pub const BAUD_RATE: u32 = 115200;

/// How long a single read may block before the loop re-checks for a stop request
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyUSB3, /dev/ttyACM0)
    pub port_path: String,
    /// Baud rate (115200)
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Read timeout, used as the poll interval
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from(DEFAULT_PORT),
            baud_rate: BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: POLL_INTERVAL,
        }
    }
}

impl PortConfig {
    /// Create a configuration for `port_path` with the fixed line settings
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Set the read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Opens connections to a named port.
///
/// The reconnect loop only needs this capability, so tests can stand in a
/// scripted device for the real hardware.
pub trait Connector {
    type Connection: Read;

    fn open(&mut self, port: &str) -> Result<Self::Connection, StreamError>;
}

/// Open serial port handle
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: &PortConfig) -> Result<Self, StreamError> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|source| StreamError::Open {
                port: config.port_path.clone(),
                source,
            })?;

        Ok(Self { port })
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

/// Connector backed by the OS serial driver
#[derive(Debug, Clone)]
pub struct SerialConnector {
    timeout: Duration,
}

impl SerialConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SerialConnector {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

impl Connector for SerialConnector {
    type Connection = SerialConnection;

    fn open(&mut self, port: &str) -> Result<SerialConnection, StreamError> {
        let config = PortConfig::new(port).with_timeout(self.timeout);
        SerialConnection::open(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.port_path, "/dev/ttyUSB3");
        assert_eq!(config.timeout, POLL_INTERVAL);
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyACM0").with_timeout(Duration::from_secs(1));

        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, BAUD_RATE);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_open_missing_port_fails_with_open_error() {
        let mut connector = SerialConnector::default();
        let err = match connector.open("/dev/usbserial-test-does-not-exist") {
            Ok(_) => panic!("opening a missing device should fail"),
            Err(e) => e,
        };

        match err {
            StreamError::Open { port, .. } => {
                assert_eq!(port, "/dev/usbserial-test-does-not-exist")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
