// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::record::Record;
use log::Level;
use std::sync::atomic::{self, AtomicUsize, Ordering};
use std::time::SystemTime;
use time::format_description::FormatItem;
use time::macros::format_description;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

static TARGET_SIZE: atomic::AtomicUsize = atomic::AtomicUsize::new(16);
static TGID_SIZE: atomic::AtomicUsize = atomic::AtomicUsize::new(4);
static TID_SIZE: atomic::AtomicUsize = atomic::AtomicUsize::new(4);

/// Render the contextual prefix and message body of `record` into `writer`.
///
/// No trailing terminator is written; line sequencing belongs to the console
/// sink.
pub fn format<W: std::io::Write>(record: &Record, mut writer: W) -> Result<(), std::io::Error> {
    let timestamp = {
        let timestamp = record.timestamp;
        let timestamp = time::OffsetDateTime::from_unix_timestamp_nanos(
            timestamp
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_nanos() as i128,
        )
        .unwrap();
        timestamp
            .format(TIMESTAMP_FORMAT)
            .expect("failed to format timestamp")
    };

    let level = record.level;
    let tgid = format_id(record.tgid, &TGID_SIZE, true);
    let tid = format_id(record.tid, &TID_SIZE, false);
    let message = record.args;

    let target = {
        let target = record.target;
        TARGET_SIZE.fetch_max(target.len(), Ordering::Relaxed);
        let target_size = TARGET_SIZE.load(Ordering::Relaxed);
        format!("{target:<s$}", s = target_size)
    };

    // Log location on trace level - otherwise just the message.
    if record.level == Level::Trace {
        let file = record.file.unwrap_or("file unknown");
        let line = record.line.unwrap_or(0);
        write!(
            writer,
            "{timestamp} {target} ({tgid} {tid}): {level:<5}: {file}:{line}: {message}",
        )
    } else {
        write!(
            writer,
            "{timestamp} {target} ({tgid} {tid}): {level:<5}: {message}"
        )
    }
}

/// Format `id` as hex, padded to the widest id seen so far. Update `g` with
/// the maximum length of the formatted `id`.
fn format_id(id: u32, g: &AtomicUsize, align_left: bool) -> String {
    let id_len = num_hex_digits(id);
    g.fetch_max(id_len, Ordering::Relaxed);
    let len = g.load(Ordering::Relaxed);
    if align_left {
        format!("{:<l$x}", id, l = len)
    } else {
        format!("{:>l$x}", id, l = len)
    }
}

// Calculate the number of hex digits needed to represent `n`.
fn num_hex_digits(n: u32) -> usize {
    (1 + n.checked_ilog2().unwrap_or_default() / 4) as usize
}
