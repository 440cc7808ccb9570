use super::IoAdapter;
use crate::{config::LinkConfig, error::Result};
use serialport::{ClearBuffer, SerialPort};
use std::{
    io::{ErrorKind, Read, Write},
    time::Duration,
};

/// Serial port whose read timeout follows the deadline of the active request
pub struct SerialPortAdapter {
    port: Box<dyn SerialPort>,
}

impl SerialPortAdapter {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        SerialPortAdapter { port }
    }

    pub fn open(path: &str, conf: &LinkConfig) -> Result<Self> {
        log::debug!("Opening {} at {} baud", path, conf.baud_rate);
        let port = serialport::new(path, conf.baud_rate)
            .timeout(conf.ack_timeout)
            .open()?;
        Ok(SerialPortAdapter::new(port))
    }
}

impl IoAdapter for SerialPortAdapter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.port.write_all(buf)?;
        self.port.flush()?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.port.set_timeout(timeout)?;
        match self.port.read(buf) {
            Ok(count) => Ok(count),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn discard_input(&mut self, _limit: usize) -> Result<usize> {
        let pending = self.port.bytes_to_read()? as usize;
        self.port.clear(ClearBuffer::Input)?;
        Ok(pending)
    }
}
