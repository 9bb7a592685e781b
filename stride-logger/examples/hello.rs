// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use log::{debug, info, log, warn, Level, LevelFilter};

fn main() {
    stride_logger::init(LevelFilter::Trace);

    // Logs a static string on level `trace`.
    log!(Level::Trace, "Starting up");

    // Logs on level `debug` with `target` set to "hello".
    log!(target: "hello", Level::Debug, "A debug message with a target");

    // Logs a format string on level `info`.
    info!("The answer is {}", 42);

    // Keeps the next record on the same line.
    info!(same_line = true; "Counting: ");
    for i in 0..3 {
        info!(same_line = true; "{i} ");
    }
    info!("done");

    debug!("That was it");
    warn!("Bye");
}
