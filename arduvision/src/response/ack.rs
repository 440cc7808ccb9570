use crate::{config::ACK_BUF_LEN, error::ProtocolError};
use arraystring::MaxString;
use core::{
    fmt,
    fmt::{Debug, Display},
    ops::Range,
    str::from_utf8,
};

/// Acknowledgment text the camera sent before its payload, CR/LF stripped
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct AckLine {
    text: MaxString,
}

impl AckLine {
    pub(crate) fn try_new(line: &[u8]) -> Result<AckLine, ProtocolError> {
        let len = line.len();
        let text = from_utf8(line).map_err(|_| ProtocolError::UnreadableAck { len })?;
        Ok(AckLine {
            text: MaxString::try_from_str(text).map_err(|_| ProtocolError::AckOverflow { len })?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

impl Display for AckLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed size storage for the bytes read while waiting for an acknowledgment.
/// Noise lines are consumed from the front, but their space is not reclaimed
/// until the next `clear`, which caps everything read per request at `ACK_BUF_LEN`.
pub struct AckBuffer {
    buf: [u8; ACK_BUF_LEN],
    // Start of bytes which were not yet consumed
    start: usize,
    // Points to the top of buffer
    top: usize,
}

impl Default for AckBuffer {
    fn default() -> Self {
        AckBuffer {
            buf: [0; ACK_BUF_LEN],
            start: 0,
            top: 0,
        }
    }
}

impl AckBuffer {
    pub fn clear(&mut self) {
        self.start = 0;
        self.top = 0;
    }

    pub fn pending(&self) -> &[u8] {
        &self.buf[self.start..self.top]
    }

    pub(crate) fn pending_range(&self) -> Range<usize> {
        self.start..self.top
    }

    pub(crate) fn bytes(&self, range: Range<usize>) -> &[u8] {
        &self.buf[range]
    }

    /// Space left for reading
    pub(crate) fn free_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.top..]
    }

    pub(crate) fn commit(&mut self, count: usize) {
        self.top = (self.top + count).min(ACK_BUF_LEN);
    }

    pub(crate) fn consume(&mut self, count: usize) {
        self.start = (self.start + count).min(self.top);
    }

    /// Bytes thrown away as noise since the last `clear`
    pub fn discarded(&self) -> usize {
        self.start
    }

    pub fn is_full(&self) -> bool {
        self.top == ACK_BUF_LEN
    }
}

impl Debug for AckBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AckBuffer")
            .field("pending", &self.pending())
            .field("discarded", &self.start)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn ack_line_text() {
        let ack = AckLine::try_new(b"OK").unwrap();
        assert_eq!(ack.to_string(), "OK");
        assert_err_eq!(AckLine::try_new(&[0xff, 0xfe]), ProtocolError::UnreadableAck { len: 2 });
    }

    #[test]
    fn buffer_fills_and_consumes() {
        let mut buf = AckBuffer::default();
        buf.free_mut()[..4].copy_from_slice(b"x\nOK");
        buf.commit(4);
        buf.consume(2);
        assert_eq!(buf.pending(), b"OK");
        assert_eq!(buf.discarded(), 2);
        assert_eq!(buf.free_mut().len(), ACK_BUF_LEN - 4);
        buf.commit(ACK_BUF_LEN);
        assert!(buf.is_full());
        buf.clear();
        assert!(buf.pending().is_empty());
    }
}
