use crate::{
    command::RequestMode,
    config::{F_H, F_W, FRAME_BUFF_LEN},
    format::{pack, unpack},
    hex_parser::{decode_from_string, parse_hex_str},
    response::parser::line,
};

use claims::*;
use manifest_dir_macros::exist_relative_path;

const TRACK_BRIGHT: &'static str = include_str!(exist_relative_path!("resources/test/track_bright_example.txt"));
const STREAM_8PPB: &'static str = include_str!(exist_relative_path!("resources/test/stream_8ppb_example.txt"));

#[test]
fn decode_tracking_capture() {
    let acquisition = decode_from_string(TRACK_BRIGHT, RequestMode::TrackBright).unwrap();
    assert_eq!(acquisition.frame.mode(), RequestMode::TrackBright);
    assert_eq!(acquisition.frame.coordinate(), Some(42.0));
    // First estimate only partially moves towards the measurement
    let smoothed = acquisition.smoothed.unwrap();
    assert!(smoothed > 0.0 && smoothed < 42.0);
}

#[test]
fn decode_stream_capture() {
    let acquisition = decode_from_string(STREAM_8PPB, RequestMode::Stream8ppb).unwrap();
    let frame = acquisition.frame;
    assert_eq!(frame.len(), FRAME_BUFF_LEN);
    assert_none!(acquisition.smoothed);
    assert_none!(frame.coordinate());

    // Rows alternate between 0xAA and 0x55
    for y in 0..F_H {
        for x in 0..F_W {
            let lit = (x + y) % 2 == 0;
            assert_eq!(frame.luma(x, y), Some(if lit { 0xFF } else { 0x00 }), "({x}, {y})");
        }
    }
}

#[test]
fn capture_repacks_to_payload() {
    let (_, data) = parse_hex_str(STREAM_8PPB).expect("Could not parse hex file");
    let (payload, ack) = line(&data).expect("Capture should start with an acknowledgment");
    assert_eq!(ack, b"OK");
    let frame = assert_ok!(unpack(RequestMode::Stream8ppb, payload));
    assert_ok_eq!(pack(RequestMode::Stream8ppb, &frame), payload.to_vec());
}

#[test]
fn capture_for_other_mode_is_rejected() {
    // 2 byte tracking payload is followed by silence while a frame is expected
    assert_err!(decode_from_string(TRACK_BRIGHT, RequestMode::Stream1ppb));
}
