//! crates/l4c/src/writer.rs
//! Output sinks behind a logger context.

use std::io::{self, Write};
use std::time::SystemTime;

use tracing::warn;

use crate::destination::Destination;
use crate::error::Result;
use crate::rotation::FileWriter;

/// Sink a context hands finished records to.
#[derive(Debug)]
pub(crate) enum Writer {
    Stdout,
    Stderr,
    File(FileWriter),
}

impl Writer {
    /// Builds the sink for `destination`, opening file destinations at `now`.
    pub(crate) fn open(destination: Destination, now: SystemTime) -> Result<Self> {
        match destination {
            Destination::Stdout => Ok(Self::Stdout),
            Destination::Stderr => Ok(Self::Stderr),
            Destination::File(options) => {
                let mut file = FileWriter::new(options)?;
                file.open(now)?;
                Ok(Self::File(file))
            }
        }
    }

    /// Writes one batch of records.
    ///
    /// `Ok(false)` means the bytes were dropped after a write failure.
    pub(crate) fn write(&mut self, bytes: &[u8], now: SystemTime) -> Result<bool> {
        match self {
            Self::Stdout => Ok(write_stream(&mut io::stdout().lock(), bytes, "stdout")),
            Self::Stderr => Ok(write_stream(&mut io::stderr().lock(), bytes, "stderr")),
            Self::File(file) => file.write(bytes, now),
        }
    }

    pub(crate) fn close(&mut self) {
        if let Self::File(file) = self {
            file.close();
        }
    }

    pub(crate) const fn as_file(&self) -> Option<&FileWriter> {
        match self {
            Self::File(file) => Some(file),
            Self::Stdout | Self::Stderr => None,
        }
    }
}

fn write_stream(stream: &mut impl Write, bytes: &[u8], name: &'static str) -> bool {
    match stream.write_all(bytes).and_then(|()| stream.flush()) {
        Ok(()) => true,
        Err(error) => {
            warn!(target: "l4c::writer", stream = name, %error, "write failed, record dropped");
            false
        }
    }
}
