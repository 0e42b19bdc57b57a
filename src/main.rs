//! usbserial
//!
//! Reads newline-delimited text from a serial device and prints each line to
//! stdout as it arrives. When the device goes away the port is reopened, so
//! the tool can be left running across unplug/replug cycles.
//!
//! # Usage
//!
//! ```bash
//! # Read from the default port (/dev/ttyUSB3) at 115200 baud
//! usbserial
//!
//! # Read from another port
//! usbserial /dev/ttyACM0
//! ```
//!
//! Status lines (`> opening <port>`, `> stop`) share stdout with the data;
//! diagnostics go to stderr and follow `RUST_LOG`.

mod error;
mod serial;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serial::{ReconnectingReader, SerialConnector, DEFAULT_PORT};

/// Print lines from a serial device at 115200 baud, reopening the port whenever it drops.
///
/// The only input is the port path; it is taken verbatim, even when it looks
/// like a flag, and anything after it is ignored.
#[derive(Parser)]
#[command(name = "usbserial")]
#[command(author = "Prasanna Gautam")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Serial port path
    #[arg(default_value = DEFAULT_PORT, allow_hyphen_values = true)]
    port: String,

    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if !cli.ignored.is_empty() {
        log::debug!("ignoring extra arguments: {:?}", cli.ignored);
    }

    let stop = Arc::new(AtomicBool::new(false));
    stop_on_interrupt(Arc::clone(&stop))?;

    let mut reader =
        ReconnectingReader::new(SerialConnector::default(), cli.port, io::stdout().lock(), stop);
    reader.run().context("Serial reader stopped")?;
    log::debug!(
        "read {} lines over {} connection attempts",
        reader.lines(),
        reader.attempts()
    );

    Ok(())
}

/// Raise `stop` on Ctrl+C; the reader prints the stop line and returns
fn stop_on_interrupt(stop: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        log::debug!("interrupt received");
        stop.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")
}
