//! Link, geometry and filter settings shared by the host and the camera firmware

use core::time::Duration;

/// Baud rate the camera firmware configures its UART with
pub const BAUDRATE: u32 = 500_000;

pub const LF: u8 = b'\n';
pub const CR: u8 = b'\r';

/// Native resolution frames are drawn at
pub const SCR_W: usize = 640;
pub const SCR_H: usize = 480;
/// Resolution of a captured frame
pub const F_W: usize = 80;
pub const F_H: usize = 60;
/// Bytes per unpacked pixel, luma followed by chroma
pub const BPP: usize = 2;
/// How many screen pixels a single frame pixel covers
pub const DRAW_SCALE: usize = SCR_W / F_W;

/// Longest row, packed or unpacked
pub const MAX_ROW_LEN: usize = F_W * BPP;
/// Longest row together with its line feed
pub const MAX_ROW_BUFF_LEN: usize = MAX_ROW_LEN + 1;
/// Size of a fully unpacked frame
pub const FRAME_BUFF_LEN: usize = F_W * F_H * BPP;

/// Capacity for an acknowledgment line, line feed included
pub const ACK_BUF_LEN: usize = 255;
/// Milliseconds to wait for an acknowledgment, and then again for a payload
pub const SERIAL_TIMEOUT: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub baud_rate: u32,
    /// Measured from the moment a request byte is written
    pub ack_timeout: Duration,
    /// Measured from the moment an acknowledgment is recognized
    pub payload_timeout: Duration,
    /// Upper bound of stale bytes thrown away before writing a request
    pub drain_limit: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            baud_rate: BAUDRATE,
            ack_timeout: Duration::from_millis(SERIAL_TIMEOUT),
            payload_timeout: Duration::from_millis(SERIAL_TIMEOUT),
            drain_limit: MAX_ROW_BUFF_LEN * F_H,
        }
    }
}

/// Noise variances of the scalar estimator. Pixel coordinates and brightness
/// levels want different tunings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    pub process_noise: f64,
    pub measurement_noise: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            process_noise: 0.0001,
            measurement_noise: 0.00025,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_consistent() {
        assert_eq!(FRAME_BUFF_LEN, 9600);
        assert_eq!(MAX_ROW_BUFF_LEN, 161);
        assert_eq!(DRAW_SCALE * F_W, SCR_W);
        assert_eq!(DRAW_SCALE * F_H, SCR_H);
    }
}
