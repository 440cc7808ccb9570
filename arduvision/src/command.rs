use crate::{
    config::{BPP, F_W},
    error::FormatError,
};
use core::str::FromStr;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Request understood by the camera firmware. Discriminants are the bytes
/// written on the wire.
#[derive(FromPrimitive, EnumIter, Display, Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum RequestMode {
    #[default]
    None = 0,
    TrackDark = 1,
    TrackBright = 2,
    Stream8ppb = 3,
    Stream4ppb = 4,
    Stream2ppb = 5,
    Stream1ppb = 6,
    Stream0ppb = 7,
}

impl RequestMode {
    pub fn try_from_code(c: u8) -> Result<Self, FormatError> {
        FromPrimitive::from_u8(c).ok_or(FormatError::UnknownMode(c))
    }

    /// Convert request into the byte code sent to the camera
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Bytes per row for streaming modes, coordinate size for tracking modes
    pub fn param(self) -> usize {
        use RequestMode::*;
        match self {
            None => 0,
            TrackDark => 1,
            TrackBright => 2,
            Stream8ppb => F_W / 8,
            Stream4ppb => F_W / 4,
            Stream2ppb => F_W / 2,
            Stream1ppb => F_W,
            Stream0ppb => F_W * BPP,
        }
    }

    /// Pixels sharing a single wire byte. `None` for unpacked and non-streaming modes.
    pub fn pixels_per_byte(self) -> Option<usize> {
        use RequestMode::*;
        match self {
            Stream8ppb => Some(8),
            Stream4ppb => Some(4),
            Stream2ppb => Some(2),
            Stream1ppb => Some(1),
            _ => Option::None,
        }
    }

    pub fn is_streaming(self) -> bool {
        self.pixels_per_byte().is_some() || self == RequestMode::Stream0ppb
    }

    pub fn is_tracking(self) -> bool {
        matches!(self, RequestMode::TrackDark | RequestMode::TrackBright)
    }

    pub(crate) fn encode(self) -> [u8; 1] {
        [self.code()]
    }
}

impl FromStr for RequestMode {
    type Err = FormatError;

    /// Accepts either the wire code or the kebab-case name, e.g. "6" or "stream1ppb"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return RequestMode::try_from_code(code);
        }
        RequestMode::iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| FormatError::UnknownModeName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use RequestMode::*;

    #[test]
    fn streaming_params_are_row_lengths() {
        assert_eq!(Stream8ppb.param(), 10);
        assert_eq!(Stream4ppb.param(), 20);
        assert_eq!(Stream2ppb.param(), 40);
        assert_eq!(Stream1ppb.param(), 80);
        assert_eq!(Stream0ppb.param(), 160);
        for mode in RequestMode::iter().filter(|m| m.is_streaming()) {
            assert!(mode.param() > 0, "{mode} has an empty row");
        }
    }

    #[test]
    fn tracking_params_are_coordinate_sizes() {
        assert_eq!(TrackDark.param(), 1);
        assert_eq!(TrackBright.param(), 2);
        assert!(!TrackBright.is_streaming());
        assert!(TrackBright.is_tracking());
    }

    #[test]
    fn unpacked_stream_is_not_none() {
        assert!(Stream0ppb.is_streaming());
        assert_eq!(Stream0ppb.pixels_per_byte(), Option::None);
        assert!(!None.is_streaming());
        assert!(!None.is_tracking());
    }

    #[test]
    fn codes_round_trip() {
        for mode in RequestMode::iter() {
            assert_ok_eq!(RequestMode::try_from_code(mode.code()), mode);
        }
        assert_err_eq!(RequestMode::try_from_code(8), FormatError::UnknownMode(8));
        assert_eq!(Stream1ppb.encode(), [0x06]);
    }

    #[test]
    fn parse_names_and_codes() {
        assert_ok_eq!("stream1ppb".parse::<RequestMode>(), Stream1ppb);
        assert_ok_eq!("track-bright".parse::<RequestMode>(), TrackBright);
        assert_ok_eq!("3".parse::<RequestMode>(), Stream8ppb);
        assert_err!("stream16ppb".parse::<RequestMode>());
    }
}
