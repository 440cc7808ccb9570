use super::IoAdapter;
use crate::error::Result;
use std::{
    io::{ErrorKind, Read, Write},
    time::Duration,
};

/// Adapter for plain std streams. Read timeouts are whatever the underlying
/// stream is configured with, an expired one is reported as an empty read.
pub struct StdIoAdapter<IO: Read + Write> {
    io: IO,
}

impl<IO: Read + Write> IoAdapter for StdIoAdapter<IO> {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.io.write_all(buf)?;
        self.io.flush()?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        match self.io.read(buf) {
            Ok(count) => Ok(count),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    // Std streams can not be polled without blocking, stale input is left to
    // the acknowledgment scan instead
    fn discard_input(&mut self, _limit: usize) -> Result<usize> {
        Ok(0)
    }
}

impl<IO: Read + Write> StdIoAdapter<IO> {
    pub fn new(io: IO) -> Self {
        StdIoAdapter { io }
    }

    pub fn into_inner(self) -> IO {
        self.io
    }
}
