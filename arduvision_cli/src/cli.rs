use crate::{output::Output, serial::SerialConf};
use arduvision::{error::FormatError, EstimatorConfig, RequestMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists connected serial devices
    List,
    /// Grab frames from the camera
    Grab(GrabConf),
    /// Follow the darkest or brightest point seen by the camera
    Track(TrackConf),
    /// Decode a hex dump of a captured camera response
    Replay(ReplayConf),
}

#[derive(Args)]
pub struct GrabConf {
    /// Pixel packing of the frame, as a name like "stream4ppb" or a mode code
    #[clap(short, long, value_parser = parse_streaming_mode, default_value = "stream4ppb")]
    pub mode: RequestMode,

    /// Requests made before giving up on a frame
    #[clap(long, value_parser, default_value = "3")]
    pub attempts: usize,

    #[clap(flatten)]
    pub output: Output,

    #[clap(flatten)]
    pub serial: SerialConf,
}

#[derive(Args)]
pub struct TrackConf {
    /// Which point to follow, "track-dark" or "track-bright"
    #[clap(short, long, value_parser = parse_tracking_mode, default_value = "track-bright")]
    pub mode: RequestMode,

    /// Amount of coordinates to take, runs until interrupted if omitted
    #[clap(short, long, value_parser)]
    pub count: Option<usize>,

    /// Requests made before skipping a coordinate
    #[clap(long, value_parser, default_value = "3")]
    pub attempts: usize,

    /// Process noise of the smoothing filter
    #[clap(long, value_parser, default_value_t = EstimatorConfig::default().process_noise)]
    pub process_noise: f64,

    /// Measurement noise of the smoothing filter
    #[clap(long, value_parser, default_value_t = EstimatorConfig::default().measurement_noise)]
    pub measurement_noise: f64,

    #[clap(flatten)]
    pub serial: SerialConf,
}

impl TrackConf {
    pub fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            process_noise: self.process_noise,
            measurement_noise: self.measurement_noise,
        }
    }
}

#[derive(Args)]
pub struct ReplayConf {
    /// Hex dump of everything the camera sent after a request
    #[clap(short, long, value_parser, value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Mode the captured response was requested with
    #[clap(short, long, value_parser = parse_mode)]
    pub mode: RequestMode,

    #[clap(flatten)]
    pub output: Output,
}

fn parse_mode(s: &str) -> Result<RequestMode, FormatError> {
    let mode: RequestMode = s.parse()?;
    match mode {
        RequestMode::None => Err(FormatError::NoPayload(mode)),
        mode => Ok(mode),
    }
}

fn parse_streaming_mode(s: &str) -> Result<RequestMode, FormatError> {
    let mode = parse_mode(s)?;
    if mode.is_streaming() {
        Ok(mode)
    } else {
        Err(FormatError::UnknownModeName(s.to_owned()))
    }
}

fn parse_tracking_mode(s: &str) -> Result<RequestMode, FormatError> {
    let mode = parse_mode(s)?;
    if mode.is_tracking() {
        Ok(mode)
    } else {
        Err(FormatError::UnknownModeName(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_arguments() {
        assert_eq!(parse_mode("3").unwrap(), RequestMode::Stream8ppb);
        assert_eq!(parse_streaming_mode("stream0ppb").unwrap(), RequestMode::Stream0ppb);
        assert_eq!(parse_tracking_mode("Track-Dark").unwrap(), RequestMode::TrackDark);
        assert!(parse_mode("none").is_err());
        assert!(parse_streaming_mode("track-bright").is_err());
        assert!(parse_tracking_mode("stream1ppb").is_err());
    }

    #[test]
    fn arguments_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
