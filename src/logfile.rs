// MdvrSim: Mobile Distance-Vector Routing Simulator written in Rust
// Copyright 2024 The MdvrSim Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persisted per-router event logs.
//!
//! Every router writes its protocol events to `{id:05}.log` inside the configured log
//! directory, one `{time:5}: {message}` line per event. A failed write is reported once via
//! the global logger and never interrupts the simulation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Sink for the protocol events of a single router.
#[derive(Debug)]
pub enum RouterLog {
    /// Write lines to a buffered file, the production sink.
    File {
        /// The open log file.
        writer: BufWriter<File>,
        /// Whether a write error was already reported.
        failed: bool,
    },
    /// Keep lines in memory, used by tests.
    Memory(Vec<String>),
    /// Drop all lines.
    Discard,
}

impl RouterLog {
    /// Open the log file `{index:05}.log` inside `dir`, truncating a previous one.
    pub fn file(dir: &Path, index: usize) -> io::Result<Self> {
        let path = dir.join(format!("{index:05}.log"));
        let writer = BufWriter::new(File::create(path)?);
        Ok(Self::File {
            writer,
            failed: false,
        })
    }

    /// An in-memory sink, inspectable through [`RouterLog::lines`].
    pub fn memory() -> Self {
        Self::Memory(Vec::new())
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self::Discard
    }

    /// Append one timestamped line.
    pub(crate) fn line(&mut self, time: usize, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        match self {
            RouterLog::File { writer, failed } => {
                if let Err(e) = writeln!(writer, "{time:5}: {msg}") {
                    if !*failed {
                        log::error!("writing to a router log failed: {e}");
                        *failed = true;
                    }
                }
            }
            RouterLog::Memory(lines) => lines.push(format!("{time:5}: {msg}")),
            RouterLog::Discard => {}
        }
    }

    /// The recorded lines of an in-memory sink; empty for the other variants.
    pub fn lines(&self) -> &[String] {
        match self {
            RouterLog::Memory(lines) => lines,
            _ => &[],
        }
    }

    /// Flush a file-backed sink to disk.
    pub fn flush(&mut self) {
        if let RouterLog::File { writer, failed } = self {
            if let Err(e) = writer.flush() {
                if !*failed {
                    log::error!("flushing a router log failed: {e}");
                    *failed = true;
                }
            }
        }
    }
}

impl Drop for RouterLog {
    fn drop(&mut self) {
        self.flush();
    }
}
