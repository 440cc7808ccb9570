pub mod ack;
pub mod parser;

use crate::{
    command::RequestMode,
    config::{BPP, F_H, F_W, MAX_ROW_LEN},
};
use nom::number::complete::{be_u16, be_u8};

pub use ack::{AckBuffer, AckLine};

/// Decoded result of a single acquisition. Streaming modes hold `F_W * F_H`
/// pixels of `BPP` bytes, tracking modes hold the raw coordinate bytes.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FrameBuffer {
    mode: RequestMode,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub(crate) fn new(mode: RequestMode, data: Vec<u8>) -> Self {
        FrameBuffer { mode, data }
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unpacked rows, top to bottom. Empty for tracking payloads.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let len = if self.mode.is_streaming() {
            self.data.len()
        } else {
            0
        };
        self.data[..len].chunks_exact(MAX_ROW_LEN)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if !self.mode.is_streaming() || x >= F_W || y >= F_H {
            return None;
        }
        let start = (y * F_W + x) * BPP;
        self.data.get(start..start + BPP)
    }

    /// Brightness of a pixel, the first byte of each unpacked pixel
    pub fn luma(&self, x: usize, y: usize) -> Option<u8> {
        self.pixel(x, y).map(|p| p[0])
    }

    /// Tracked coordinate: one byte as is, two bytes as a big-endian word
    pub fn coordinate(&self) -> Option<f64> {
        if !self.mode.is_tracking() {
            return None;
        }
        match self.data.len() {
            1 => be_u8::<_, nom::error::Error<&[u8]>>(self.data.as_slice())
                .ok()
                .map(|(_, c)| c.into()),
            2 => be_u16::<_, nom::error::Error<&[u8]>>(self.data.as_slice())
                .ok()
                .map(|(_, c)| c.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FRAME_BUFF_LEN;

    #[test]
    fn coordinates_from_tracking_payloads() {
        let bright = FrameBuffer::new(RequestMode::TrackBright, vec![0x00, 0x2A]);
        assert_eq!(bright.coordinate(), Some(42.0));
        let wide = FrameBuffer::new(RequestMode::TrackBright, vec![0x01, 0x00]);
        assert_eq!(wide.coordinate(), Some(256.0));
        let dark = FrameBuffer::new(RequestMode::TrackDark, vec![17]);
        assert_eq!(dark.coordinate(), Some(17.0));
    }

    #[test]
    fn streaming_frames_have_no_coordinate() {
        let frame = FrameBuffer::new(RequestMode::Stream1ppb, vec![0; FRAME_BUFF_LEN]);
        assert_eq!(frame.coordinate(), None);
        assert_eq!(frame.rows().count(), F_H);
    }

    #[test]
    fn pixel_lookup() {
        let mut data = vec![0; FRAME_BUFF_LEN];
        data[(F_W + 2) * BPP] = 200;
        let frame = FrameBuffer::new(RequestMode::Stream0ppb, data);
        assert_eq!(frame.luma(2, 1), Some(200));
        assert_eq!(frame.luma(F_W, 0), None);
        assert_eq!(frame.pixel(0, F_H), None);
    }
}
