use crate::{
    acquisition::{Acquisition, AcquisitionLoop},
    command::RequestMode,
    config::{EstimatorConfig, LinkConfig},
    error::{Error, Result},
    io_adapter::replay::ReplayAdapter,
};
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::multispace0,
    combinator::{all_consuming, map_res},
    multi::many1,
    sequence::delimited,
    IResult,
};

/// Decodes a pair of chars formatted as hex into a byte. For example "FF" -> 255
fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |hex| u8::from_str_radix(hex, 16),
    )(input)
}

/// Parses a hex dump of a serial capture, bytes may be separated by whitespace
pub fn parse_hex_str(input: &str) -> IResult<&str, Vec<u8>> {
    all_consuming(many1(delimited(multispace0, hex_byte, multispace0)))(input)
}

/// Replays a hex dump of a camera response to a `mode` request through the
/// whole acquisition path
pub fn decode_from_string(input: &str, mode: RequestMode) -> Result<Acquisition> {
    let (_, data) =
        parse_hex_str(input).map_err(|_| Error::InvalidData("Could not parse hex file"))?;
    AcquisitionLoop::new(
        ReplayAdapter::new(data),
        LinkConfig::default(),
        EstimatorConfig::default(),
    )
    .run_once(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::{
        error::{make_error, ErrorKind},
        Err::Error,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_byte_parser() {
        assert_eq!(hex_byte("FF"), Ok(("", 255)));
        assert_eq!(hex_byte("ff"), Ok(("", 255)));
        assert!(hex_byte("NH").is_err());
    }

    #[test]
    fn hex_str_parser() {
        assert_eq!(parse_hex_str("DEADBEEF"), Ok(("", vec![0xDE, 0xAD, 0xBE, 0xEF])));
        assert_eq!(parse_hex_str(" DE   AD\nBEEF    "), Ok(("", vec![0xDE, 0xAD, 0xBE, 0xEF])));
        assert_eq!(parse_hex_str("NOT HEX"), Err(Error(make_error("NOT HEX", ErrorKind::TakeWhileMN))));
        assert_eq!(parse_hex_str("DE AD BE EF NO TH EX"), Err(Error(make_error("NO TH EX", ErrorKind::Eof))));
    }

    #[test]
    fn decode_tracking_dump() {
        let acquisition = decode_from_string("4F 4B 0A 00 2A", RequestMode::TrackBright).unwrap();
        assert_eq!(acquisition.frame.coordinate(), Some(42.0));
        assert!(acquisition.smoothed.is_some());
    }

    #[test]
    fn reject_garbage() {
        assert!(matches!(
            decode_from_string("zz", RequestMode::TrackDark),
            Err(crate::error::Error::InvalidData(_))
        ));
    }
}
