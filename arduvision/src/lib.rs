//! Frame acquisition and point tracking for a low resolution camera behind a
//! microcontroller, talking a request/acknowledge protocol over a serial line.
//!
//! A request is a single mode byte. The firmware answers with an
//! acknowledgment line followed by a payload: either a packed grayscale frame
//! split into line feed terminated rows, or a tracked coordinate.

pub mod acquisition;
pub mod command;
pub mod config;
pub mod error;
pub mod estimator;
pub mod format;
pub mod hex_parser;
pub mod io_adapter;
pub mod request;
pub mod response;

#[cfg(test)]
mod tests;

pub use acquisition::{Acquisition, AcquisitionLoop};
pub use command::RequestMode;
pub use config::{EstimatorConfig, LinkConfig};
pub use error::{Error, FormatError, Phase, ProtocolError, Result};
pub use estimator::Estimator;
pub use format::{pack, unpack};
pub use io_adapter::{replay::ReplayAdapter, std_io::StdIoAdapter, Clock, IoAdapter, MonotonicClock};
#[cfg(feature = "serialport")]
pub use io_adapter::serial::SerialPortAdapter;
pub use request::{RequestStateMachine, RequestStatus};
pub use response::{AckLine, FrameBuffer};
