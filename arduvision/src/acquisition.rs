use crate::{
    command::RequestMode,
    config::{EstimatorConfig, LinkConfig},
    error::Result,
    estimator::Estimator,
    format::unpack,
    io_adapter::{Clock, IoAdapter, MonotonicClock},
    request::RequestStateMachine,
    response::FrameBuffer,
};
use scopeguard::guard;

/// Outcome of one request cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub frame: FrameBuffer,
    /// Smoothed tracking coordinate, present for tracking modes only
    pub smoothed: Option<f64>,
}

/// Repeatedly requests frames from a camera, decodes them and smooths
/// tracking coordinates across requests.
pub struct AcquisitionLoop<IO, C = MonotonicClock>
where
    IO: IoAdapter,
    C: Clock,
{
    machine: RequestStateMachine<IO, C>,
    estimator: Estimator,
}

impl<IO: IoAdapter> AcquisitionLoop<IO> {
    pub fn new(io: IO, link: LinkConfig, estimator: EstimatorConfig) -> Self {
        AcquisitionLoop {
            machine: RequestStateMachine::new(io, link),
            estimator: Estimator::new(estimator),
        }
    }
}

impl<IO, C> AcquisitionLoop<IO, C>
where
    IO: IoAdapter,
    C: Clock,
{
    pub fn from_parts(machine: RequestStateMachine<IO, C>, estimator: Estimator) -> Self {
        AcquisitionLoop { machine, estimator }
    }

    pub fn run_once(&mut self, mode: RequestMode) -> Result<Acquisition> {
        let payload = self.machine.acquire(mode)?;
        let frame = {
            // Back to idle whether decoding succeeds or not
            let machine = guard(&mut self.machine, |m| m.finish());
            unpack(machine.mode(), &payload)?
        };

        let smoothed = frame.coordinate().map(|coordinate| {
            let smoothed = self.estimator.update(coordinate);
            log::debug!("Tracked {} at {}, smoothed to {:.3}", mode, coordinate, smoothed);
            smoothed
        });
        Ok(Acquisition { frame, smoothed })
    }

    /// Same as `run_once`, but repeats timed out or garbled requests up to
    /// `attempts` times in total
    pub fn run_with_retries(&mut self, mode: RequestMode, attempts: usize) -> Result<Acquisition> {
        let mut attempt = 1;
        loop {
            match self.run_once(mode) {
                Err(e) if e.is_recoverable() && attempt < attempts => {
                    log::warn!("Attempt {}/{} to get {} failed: {}", attempt, attempts, mode, e);
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    pub fn machine(&self) -> &RequestStateMachine<IO, C> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut RequestStateMachine<IO, C> {
        &mut self.machine
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn into_inner(self) -> IO {
        self.machine.into_inner()
    }
}
