// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Console logger with progress indicator support.
//!
//! A backend for the `log` facade that can keep consecutive records on the
//! same output line and overwrite a previously written record in place.
//! Two markers control this, attached per call as structured key-values:
//!
//! - `same_line`: no terminator is added at the end of the line, so the next
//!   record continues it.
//! - `overwrite`: after writing, the cursor is rewound to the start of the
//!   message, allowing the message to be overwritten. This is useful for
//!   drawing progress bar backgrounds.
//!
//! ```no_run
//! use log::{info, LevelFilter};
//!
//! stride_logger::init(LevelFilter::Info);
//! info!(same_line = true; "Working ");
//! info!("done");
//! ```

use log::{LevelFilter, Log, Metadata};
use std::io::{self, Write};
use std::process;
use std::str::{self, FromStr};
use std::time::SystemTime;

mod console;
pub mod fmt;
pub mod record;
mod thread;

pub use console::{Console, Flags};

const ENV_RUST_LOG: &str = "RUST_LOG";
const MAX_ARGS_SIZE: usize = 8 * 1024;

/// Initialize the logger with the default console sink.
///
/// A valid level passed as `RUST_LOG` environment variable overrides `level`.
pub fn init(level: LevelFilter) {
    init_with(Console::default(), level)
}

/// Initialize the logger with a custom console sink.
pub fn init_with(console: Console, level: LevelFilter) {
    let logger = Logger::new(console);

    // Set the maximum log level the log subsystem will forward to this logger impl.
    log::set_max_level(level_from_env().unwrap_or(level));
    // Set the logger in the global subsystem.
    log::set_boxed_logger(Box::new(logger)).expect("failed to set logger")
}

/// The stride logger.
#[derive(Debug)]
pub struct Logger {
    console: Console,
}

impl Logger {
    /// Create a new logger writing to `console`.
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    fn try_log(&self, record: &log::Record) -> io::Result<()> {
        let timestamp = SystemTime::now();
        let tgid = process::id();
        let tid = thread::id();

        // Serialize args into the args buffer. This must happen without any
        // heap allocation which is ensured by using std::io::Write.
        let args_buffer = &mut [0u8; MAX_ARGS_SIZE];
        let args = {
            let mut writer = io::Cursor::new(&mut args_buffer[..]);
            write!(&mut writer, "{}", record.args())?;
            let len = writer.position() as usize;
            str::from_utf8(&args_buffer[0..len])
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        };

        let flags = Flags::from_record(record);
        let record = record::Record::new(
            timestamp,
            record.level(),
            record.target(),
            record.file(),
            record.line(),
            tgid,
            tid,
            args,
        );

        self.console.write(&record, flags)
    }
}

impl Log for Logger {
    /// Check if a log message with the specified metadata would be logged.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if let Err(error) = self.try_log(record) {
            handle_error(record.target(), &error);
        }
    }

    // The sink flushes after every record.
    fn flush(&self) {}
}

/// A broken output stream must not take the caller down. Report and go on.
fn handle_error(target: &str, error: &io::Error) {
    eprintln!("stride-logger: failed to emit record for `{target}`: {error}");
}

/// Try to parse the log level from the environment variable `RUST_LOG`.
fn level_from_env() -> Option<LevelFilter> {
    std::env::var(ENV_RUST_LOG).ok().and_then(|s| {
        LevelFilter::from_str(&s)
            .inspect_err(|_| eprintln!("Failed to parse log level from `RUST_LOG={s}`"))
            .ok()
    })
}
