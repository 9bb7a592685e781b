// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Drives the console sink through its output modes: plain lines, same-line
//! accumulation, an overwritten placeholder and a textual progress bar.

use log::{info, LevelFilter};
use std::{thread, time};

fn main() {
    stride_logger::init(LevelFilter::Debug);

    info!("Regular message");

    info!(same_line = true; "Messages on the same line: ");
    for i in 0..5 {
        info!(same_line = true; "{i} ");
        thread::sleep(time::Duration::from_millis(200));
    }
    info!("A regular message automatically adds a trailing newline");

    info!(overwrite = true; "This message can be overwritten");
    thread::sleep(time::Duration::from_secs(1));
    info!("Now the message has been replaced");

    // Draw the bar background, rewind over it, then fill it tick by tick.
    info!(same_line = true; "Progress: [");
    info!(same_line = true, overwrite = true; "{}]", " ".repeat(40));
    for _ in 0..40 {
        info!(same_line = true; "=");
        thread::sleep(time::Duration::from_millis(100));
    }
    info!("DONE");
}
