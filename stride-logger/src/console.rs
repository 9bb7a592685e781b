// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use crate::fmt;
use crate::record::Record;
use log::kv::{Key, Source};
use std::io::{self, Write};
use std::sync::Mutex;

/// ASCII backspace. Moves the cursor one column to the left.
const BACKSPACE: u8 = 0x08;

const DEFAULT_TERMINATOR: &str = "\n";

const KEY_SAME_LINE: &str = "same_line";
const KEY_OVERWRITE: &str = "overwrite";

/// Per-record output markers, attached at the call site as structured
/// key-values: `info!(same_line = true; "...")`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Suppress the trailing line terminator so that the next record
    /// continues on the same line.
    pub same_line: bool,
    /// After writing, rewind the cursor to the start of the message body so
    /// that the next record overwrites it. Useful for drawing progress bar
    /// backgrounds.
    pub overwrite: bool,
}

impl Flags {
    /// Read the markers from a record's key-values. A marker is set when the
    /// key is present with value `true`; absent keys and non-boolean values
    /// leave it unset.
    pub fn from_record(record: &log::Record) -> Flags {
        let source = record.key_values();
        let get = |key| {
            source
                .get(Key::from_str(key))
                .and_then(|value| value.to_bool())
                .unwrap_or(false)
        };
        Flags {
            same_line: get(KEY_SAME_LINE),
            overwrite: get(KEY_OVERWRITE),
        }
    }
}

/// Cursor bookkeeping carried between records.
#[derive(Debug, Default)]
struct LineState {
    /// The cursor sits mid-line after the previous record.
    on_same_line: bool,
    /// The previous record was rewound and may be overwritten.
    overwriting: bool,
}

/// Console sink writing to `stdout`.
///
/// Whole emissions are serialized behind a mutex: interleaved writes would
/// leave the cursor bookkeeping mismatched with the terminal (lost updates,
/// wrong rewind lengths).
#[derive(Debug)]
pub struct Console {
    terminator: &'static str,
    state: Mutex<LineState>,
}

impl Default for Console {
    fn default() -> Self {
        Self::with_terminator(DEFAULT_TERMINATOR)
    }
}

impl Console {
    /// Create a sink with a custom line terminator sequence.
    pub fn with_terminator(terminator: &'static str) -> Self {
        Self {
            terminator,
            state: Mutex::new(LineState::default()),
        }
    }

    pub fn write(&self, record: &Record, flags: Flags) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.emit(io::stdout().lock(), record, flags, self.terminator)
    }
}

impl LineState {
    /// Write one record, sequencing terminator, content and backspace bytes
    /// so that consecutive calls compose into separate lines, continued
    /// same-line output or in-place overwrites.
    fn emit<W: Write>(
        &mut self,
        mut stream: W,
        record: &Record,
        flags: Flags,
        terminator: &str,
    ) -> io::Result<()> {
        // Close out a previous same-line run before starting an unrelated
        // line. A rewound record is about to be overwritten instead.
        if self.on_same_line && !(flags.same_line || self.overwriting) {
            stream.write_all(terminator.as_bytes())?;
        }

        // Mid-line the contextual prefix would corrupt the line: body only.
        if self.on_same_line {
            stream.write_all(record.args.as_bytes())?;
        } else {
            fmt::format(record, &mut stream)?;
        }

        // One backspace per character of the body, not per byte. The cursor
        // must land exactly where the body began.
        if flags.overwrite {
            for _ in record.args.chars() {
                stream.write_all(&[BACKSPACE])?;
            }
            self.overwriting = true;
        } else {
            self.overwriting = false;
        }

        if flags.same_line || flags.overwrite {
            self.on_same_line = true;
        } else {
            stream.write_all(terminator.as_bytes())?;
            self.on_same_line = false;
        }

        stream.flush()
    }
}

#[cfg(test)]
mod test {
    use super::{Flags, LineState, BACKSPACE};
    use crate::fmt;
    use crate::record::Record;
    use log::Level;
    use std::io;
    use std::time::{Duration, SystemTime};

    const SAME_LINE: Flags = Flags {
        same_line: true,
        overwrite: false,
    };
    const OVERWRITE: Flags = Flags {
        same_line: false,
        overwrite: true,
    };

    fn record(args: &str) -> Record<'_> {
        let timestamp = SystemTime::UNIX_EPOCH + Duration::from_secs(45_296);
        Record::new(timestamp, Level::Info, "demo", None, None, 0x2a, 0x7, args)
    }

    /// The full rendering of `record`, as written when not mid-line.
    fn formatted(record: &Record) -> Vec<u8> {
        let mut buf = Vec::new();
        fmt::format(record, &mut buf).unwrap();
        buf
    }

    #[test]
    fn plain_record_ends_the_line() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let hello = record("Hello");
        state.emit(&mut out, &hello, Flags::default(), "\n").unwrap();

        let mut expected = formatted(&hello);
        expected.extend_from_slice(b"\n");
        assert_eq!(out, expected);
        assert!(!state.on_same_line);
        assert!(!state.overwriting);
    }

    #[test]
    fn same_line_records_join_without_terminator() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let first = record("a");
        let second = record("b");
        state.emit(&mut out, &first, SAME_LINE, "\n").unwrap();
        state.emit(&mut out, &second, SAME_LINE, "\n").unwrap();

        // The second record continues mid-line: body only, no prefix.
        let mut expected = formatted(&first);
        expected.extend_from_slice(b"b");
        assert_eq!(out, expected);
        assert!(state.on_same_line);
        assert!(!state.overwriting);
    }

    #[test]
    fn same_line_run_is_closed_before_a_new_line() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let first = record("a");
        let second = record("Next");
        state.emit(&mut out, &first, SAME_LINE, "\n").unwrap();
        state.emit(&mut out, &second, Flags::default(), "\n").unwrap();

        // The leading terminator closes the run. Body selection still sees
        // the mid-line state, so the record is written bare.
        let mut expected = formatted(&first);
        expected.extend_from_slice(b"\nNext\n");
        assert_eq!(out, expected);
        assert!(!state.on_same_line);
    }

    #[test]
    fn overwrite_rewinds_over_the_body() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let loading = record("Loading");
        state.emit(&mut out, &loading, OVERWRITE, "\n").unwrap();

        let mut expected = formatted(&loading);
        expected.extend_from_slice(&[BACKSPACE; 7]);
        assert_eq!(out, expected);
        assert!(state.on_same_line);
        assert!(state.overwriting);

        // The replacement must not be pushed to a new line, but ends its own.
        let done = record("Done");
        out.clear();
        state.emit(&mut out, &done, Flags::default(), "\n").unwrap();
        assert_eq!(out, b"Done\n");
        assert!(!state.on_same_line);
        assert!(!state.overwriting);
    }

    #[test]
    fn rewind_counts_characters_not_bytes() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let body = "7·5 µm";
        let rec = record(body);
        state.emit(&mut out, &rec, OVERWRITE, "\n").unwrap();

        let rewind: Vec<u8> = out[out.len() - body.chars().count()..].to_vec();
        assert_eq!(rewind, vec![BACKSPACE; 6]);
        assert!(body.len() > 6);
    }

    #[test]
    fn overwrite_and_same_line_combine() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let opening = record("Progress: [");
        let background = record("    ]");
        state.emit(&mut out, &opening, SAME_LINE, "\n").unwrap();
        state
            .emit(
                &mut out,
                &background,
                Flags {
                    same_line: true,
                    overwrite: true,
                },
                "\n",
            )
            .unwrap();

        let mut expected = formatted(&opening);
        expected.extend_from_slice(b"    ]");
        expected.extend_from_slice(&[BACKSPACE; 5]);
        assert_eq!(out, expected);
        assert!(state.on_same_line);
        assert!(state.overwriting);

        // Ticks overwrite the background one character at a time.
        let tick = record("=");
        state.emit(&mut out, &tick, SAME_LINE, "\n").unwrap();
        expected.extend_from_slice(b"=");
        assert_eq!(out, expected);
        assert!(!state.overwriting);
    }

    #[test]
    fn custom_terminator_is_used_at_both_ends() {
        let mut state = LineState::default();
        let mut out = Vec::new();

        let first = record("a");
        let second = record("b");
        state.emit(&mut out, &first, SAME_LINE, "\r\n").unwrap();
        state.emit(&mut out, &second, Flags::default(), "\r\n").unwrap();

        let mut expected = formatted(&first);
        expected.extend_from_slice(b"\r\nb\r\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn write_errors_surface_to_the_caller() {
        struct Broken;

        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream gone"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut state = LineState::default();
        let err = state
            .emit(Broken, &record("x"), Flags::default(), "\n")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn flags_from_record_key_values() {
        let kvs: &[(&str, bool)] = &[("same_line", true)];
        let record = log::Record::builder()
            .args(format_args!("x"))
            .key_values(&kvs)
            .build();
        let flags = Flags::from_record(&record);
        assert!(flags.same_line);
        assert!(!flags.overwrite);

        let plain = log::Record::builder().args(format_args!("x")).build();
        assert_eq!(Flags::from_record(&plain), Flags::default());

        // Present but false does not engage the marker.
        let kvs: &[(&str, bool)] = &[("overwrite", false)];
        let record = log::Record::builder()
            .args(format_args!("x"))
            .key_values(&kvs)
            .build();
        assert!(!Flags::from_record(&record).overwrite);
    }
}
