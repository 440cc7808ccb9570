use arduvision::{
    config::{BAUDRATE, SERIAL_TIMEOUT},
    AcquisitionLoop, EstimatorConfig, IoAdapter, LinkConfig, SerialPortAdapter,
};
use clap::Args;
use simple_eyre::{eyre::WrapErr, Result};
use std::time::Duration;

#[derive(Args)]
pub struct SerialConf {
    /// Name of serial port that should be used
    #[clap(short, long, value_parser)]
    pub serial: String,

    /// Baud rate the camera firmware was built with
    #[clap(long, value_parser, default_value_t = BAUDRATE)]
    pub baud_rate: u32,

    /// Milliseconds to wait for an acknowledgment
    #[clap(long, value_parser, default_value_t = SERIAL_TIMEOUT)]
    pub ack_timeout: u64,

    /// Milliseconds to wait for a payload after its acknowledgment. A full
    /// unpacked frame takes about 200ms at the default baud rate.
    #[clap(long, value_parser, default_value = "500")]
    pub payload_timeout: u64,
}

pub type SerialCamera = AcquisitionLoop<SerialPortAdapter>;

impl SerialConf {
    pub fn link(&self) -> LinkConfig {
        LinkConfig {
            baud_rate: self.baud_rate,
            ack_timeout: Duration::from_millis(self.ack_timeout),
            payload_timeout: Duration::from_millis(self.payload_timeout),
            ..LinkConfig::default()
        }
    }

    pub fn open_camera(&self, estimator: EstimatorConfig) -> Result<SerialCamera> {
        let link = self.link();
        let port = SerialPortAdapter::open(&self.serial, &link)
            .wrap_err_with(|| format!("Could not open serial port {}", self.serial))?;
        Ok(port.open_camera(link, estimator))
    }
}
