use super::IoAdapter;
use crate::error::Result;
use std::time::Duration;

/// Plays back bytes captured from a camera, e.g. a hex dump of a serial
/// session, as if they were arriving after each request
pub struct ReplayAdapter {
    data: Vec<u8>,
    pos: usize,
    written: Vec<u8>,
}

impl ReplayAdapter {
    pub fn new(data: Vec<u8>) -> Self {
        ReplayAdapter {
            data,
            pos: 0,
            written: Vec::new(),
        }
    }

    /// Request bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl IoAdapter for ReplayAdapter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.written.extend_from_slice(buf);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if self.remaining() == 0 {
            // Capture is over, the line stays silent
            std::thread::sleep(timeout);
            return Ok(0);
        }
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.data[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }

    // A capture starts with the response, there is nothing stale to drop
    fn discard_input(&mut self, _limit: usize) -> Result<usize> {
        Ok(0)
    }
}
