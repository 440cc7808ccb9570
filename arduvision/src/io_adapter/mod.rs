pub(crate) mod replay;
#[cfg(feature = "serialport")]
pub(crate) mod serial;
pub(crate) mod std_io;

use crate::{
    acquisition::AcquisitionLoop,
    config::{EstimatorConfig, LinkConfig},
    error::Result,
};
use std::time::{Duration, Instant};

/// Byte channel to the camera firmware
pub trait IoAdapter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Reads whatever arrives within `timeout`. `Ok(0)` means nothing did.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Throws away input that is already waiting, up to `limit` bytes.
    /// Returns amount of discarded bytes.
    fn discard_input(&mut self, limit: usize) -> Result<usize> {
        let mut scratch = [0u8; 64];
        let mut discarded = 0;
        while discarded < limit {
            let len = scratch.len().min(limit - discarded);
            match self.read(&mut scratch[..len], Duration::ZERO)? {
                0 => break,
                count => discarded += count,
            }
        }
        Ok(discarded)
    }

    fn open_camera(self, link: LinkConfig, estimator: EstimatorConfig) -> AcquisitionLoop<Self>
    where
        Self: Sized,
    {
        AcquisitionLoop::new(self, link, estimator)
    }
}

/// Source of monotonic time for request deadlines
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
