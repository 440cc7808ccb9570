use nom::{
    bytes::streaming::{tag, take, take_till},
    sequence::terminated,
    IResult,
};

use crate::config::{CR, LF};

const LINE_FEED: &[u8] = &[LF];

/// Takes a line terminated by a line feed, returning it without the
/// terminator and without an optional carriage return before it
pub fn line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, raw) = terminated(take_till(|b| b == LF), tag(LINE_FEED))(input)?;
    Ok((input, raw.strip_suffix(&[CR]).unwrap_or(raw)))
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' '
}

/// Acknowledgment contents are up to the firmware, anything printable counts.
/// Leftovers of an abandoned binary payload will not pass this check.
pub fn is_acknowledgment(line: &[u8]) -> bool {
    !line.is_empty() && line.iter().all(|&b| is_printable(b))
}

/// Splits a line after its last unprintable byte. Leftovers of an abandoned
/// payload without a line feed of their own end up in front of the next
/// acknowledgment this way.
pub fn split_noise(line: &[u8]) -> (&[u8], &[u8]) {
    let start = line
        .iter()
        .rposition(|&b| !is_printable(b))
        .map_or(0, |i| i + 1);
    line.split_at(start)
}

/// Takes a single payload row of `len` bytes followed by its line feed
pub fn payload_row(input: &[u8], len: usize) -> IResult<&[u8], &[u8]> {
    terminated(take(len), tag(LINE_FEED))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use nom::{Err::Incomplete, Needed};

    #[test]
    fn decode_line() {
        assert_ok_eq!(line(b"OK\nrest"), (&b"rest"[..], &b"OK"[..]));
        // Carriage return is tolerated
        assert_ok_eq!(line(b"OK\r\n"), (&b""[..], &b"OK"[..]));
        // Line feed did not arrive yet
        assert_err_eq!(line(b"OK"), Incomplete(Needed::new(1)));
    }

    #[test]
    fn recognize_acknowledgment() {
        assert!(is_acknowledgment(b"OK"));
        assert!(is_acknowledgment(b"ACK 6"));
        assert!(!is_acknowledgment(b""));
        assert!(!is_acknowledgment(&[0x00, 0xff, 0x7f]));
    }

    #[test]
    fn split_leading_noise() {
        assert_eq!(split_noise(b"\x00\x2AOK"), (&b"\x00"[..], &b"*OK"[..]));
        assert_eq!(split_noise(b"\x99\x01OK"), (&b"\x99\x01"[..], &b"OK"[..]));
        assert_eq!(split_noise(b"OK"), (&b""[..], &b"OK"[..]));
        assert_eq!(split_noise(b"OK\x00"), (&b"OK\x00"[..], &b""[..]));
    }

    #[test]
    fn decode_payload_row() {
        assert_ok_eq!(payload_row(b"abc\nd", 3), (&b"d"[..], &b"abc"[..]));
        // Row data may contain line feeds, only the offset matters
        assert_ok_eq!(payload_row(b"\n\n\n\n", 3), (&b""[..], &b"\n\n\n"[..]));
        assert_err_eq!(payload_row(b"ab", 3), Incomplete(Needed::new(1)));
        assert_err_eq!(payload_row(b"abc", 3), Incomplete(Needed::new(1)));
        // Delimiter is missing at the expected offset
        assert_err!(payload_row(b"abcd\n", 3));
    }
}
