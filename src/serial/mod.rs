//! Serial port streaming
//!
//! This module provides functionality for:
//! - Opening the device at the fixed line settings
//! - Assembling newline-terminated lines from timed-out reads
//! - Streaming those lines to stdout, reopening the port whenever it drops

pub mod lines;
pub mod port;
pub mod reader;

pub use port::{SerialConnector, DEFAULT_PORT};
pub use reader::ReconnectingReader;
