//! Pixel packing of streamed frames.
//!
//! A streamed frame is `F_H` rows, each followed by a line feed. Packed modes
//! put `8 / bits` pixels into every byte, most significant bits first, pixels
//! left to right. Unpacking widens each pixel to `BPP` bytes: the luma sample
//! stretched over the full byte range, then a neutral chroma byte.
//! `Stream0ppb` rows already hold `BPP` bytes per pixel.

use crate::{
    command::RequestMode,
    config::{BPP, F_H, FRAME_BUFF_LEN, LF},
    error::FormatError,
    response::{parser::payload_row, FrameBuffer},
};

/// Chroma byte of a grayscale pixel
pub const NEUTRAL_CHROMA: u8 = 0x80;

pub fn payload_bytes_per_row(mode: RequestMode) -> Result<usize, FormatError> {
    if mode.is_streaming() {
        Ok(mode.param())
    } else {
        Err(FormatError::NoRowStructure(mode))
    }
}

/// Amount of bytes following the acknowledgment of a request
pub fn expected_payload_bytes(mode: RequestMode) -> Result<usize, FormatError> {
    if mode.is_tracking() {
        return Ok(mode.param());
    }
    match payload_bytes_per_row(mode) {
        // Every row carries a line feed
        Ok(row_len) => Ok((row_len + 1) * F_H),
        Err(_) => Err(FormatError::NoPayload(mode)),
    }
}

fn check_len(mode: RequestMode, actual: usize) -> Result<(), FormatError> {
    let expected = expected_payload_bytes(mode)?;
    if actual != expected {
        return Err(FormatError::LengthMismatch {
            mode,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Scale a `bits` wide sample to the 0..=255 range
fn widen(sample: u8, bits: u32) -> u8 {
    let max = (1u16 << bits) - 1;
    (u16::from(sample) * 255 / max) as u8
}

pub fn unpack(mode: RequestMode, raw: &[u8]) -> Result<FrameBuffer, FormatError> {
    check_len(mode, raw.len())?;
    if mode.is_tracking() {
        return Ok(FrameBuffer::new(mode, raw.to_vec()));
    }

    let row_len = payload_bytes_per_row(mode)?;
    let mut data = Vec::with_capacity(FRAME_BUFF_LEN);
    let mut input = raw;
    for row in 0..F_H {
        let (rest, packed) =
            payload_row(input, row_len).map_err(|_| FormatError::MisplacedDelimiter { row })?;
        input = rest;

        match mode.pixels_per_byte() {
            Some(ppb) => {
                let bits = (8 / ppb) as u32;
                let mask = ((1u16 << bits) - 1) as u8;
                for &byte in packed {
                    for i in 0..ppb as u32 {
                        let shift = 8 - bits * (i + 1);
                        data.push(widen((byte >> shift) & mask, bits));
                        data.push(NEUTRAL_CHROMA);
                    }
                }
            }
            None => data.extend_from_slice(packed),
        }
    }
    log::trace!("Unpacked {} payload bytes into {} frame bytes", raw.len(), data.len());
    Ok(FrameBuffer::new(mode, data))
}

/// Inverse of `unpack`: re-packs a frame at the density of `mode`, keeping the
/// top bits of each luma sample
pub fn pack(mode: RequestMode, frame: &FrameBuffer) -> Result<Vec<u8>, FormatError> {
    if mode.is_tracking() {
        check_len(mode, frame.len())?;
        return Ok(frame.as_bytes().to_vec());
    }
    let row_len = payload_bytes_per_row(mode)?;
    if frame.len() != FRAME_BUFF_LEN {
        return Err(FormatError::LengthMismatch {
            mode,
            expected: FRAME_BUFF_LEN,
            actual: frame.len(),
        });
    }

    let mut raw = Vec::with_capacity(expected_payload_bytes(mode)?);
    for row in frame.rows() {
        match mode.pixels_per_byte() {
            Some(ppb) => {
                let bits = (8 / ppb) as u32;
                for pixels in row.chunks_exact(ppb * BPP) {
                    let byte = pixels
                        .chunks_exact(BPP)
                        .enumerate()
                        .fold(0u8, |acc, (i, pixel)| {
                            let shift = 8 - bits * (i as u32 + 1);
                            acc | ((pixel[0] >> (8 - bits)) << shift)
                        });
                    raw.push(byte);
                }
            }
            None => raw.extend_from_slice(row),
        }
        raw.push(LF);
    }
    debug_assert_eq!(raw.len(), (row_len + 1) * F_H);
    Ok(raw)
}
