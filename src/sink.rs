use std::io;

use crate::error::Error;

/// The output-sink contract (spec.md §6): accepts byte chunks in
/// order; a failure is surfaced to the caller without any attempt at
/// recovery, and bytes already written may remain.
pub trait Sink {
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Adapts any [`std::io::Write`] into a [`Sink`] — the file/stream I/O
/// adapter spec.md §1 calls out-of-scope for the core but still needs
/// a concrete implementation for the façade and the `render` binary
/// to use.
pub struct IoSink<W: io::Write> {
    inner: W,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Sink for IoSink<W> {
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.inner.write_all(bytes).map_err(Error::sink)
    }
}

impl Sink for String {
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let text = std::str::from_utf8(bytes).map_err(Error::sink)?;
        self.push_str(text);
        Ok(())
    }
}
