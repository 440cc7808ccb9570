use crate::{
    command::RequestMode,
    config::{LinkConfig, ACK_BUF_LEN},
    error::{Error, Phase, ProtocolError, Result},
    format::{expected_payload_bytes, payload_bytes_per_row},
    io_adapter::{Clock, IoAdapter, MonotonicClock},
    response::{
        parser::{is_acknowledgment, line, payload_row, split_noise},
        AckBuffer, AckLine,
    },
};
use bytes::{Bytes, BytesMut};
use core::ops::Range;
use std::time::Instant;
use strum::Display;

#[derive(Display, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Idle,
    Requested,
    Timeout,
    Arriving,
    Received,
    Processing,
}

impl RequestStatus {
    /// Whether an attempt is between its request byte and its payload hand-off
    pub fn in_flight(self) -> bool {
        use RequestStatus::*;
        matches!(self, Requested | Arriving | Received | Processing)
    }
}

/// Drives a single request through acknowledgment and payload reception.
///
/// Both waits have their own deadline, taken from `clock` when the phase is
/// entered. A failed attempt ends up in `RequestStatus::Timeout`, from where
/// (as from any other state) a new request can be started.
pub struct RequestStateMachine<IO, C = MonotonicClock>
where
    IO: IoAdapter,
    C: Clock,
{
    io: IO,
    clock: C,
    conf: LinkConfig,
    status: RequestStatus,
    mode: RequestMode,
    ack: AckBuffer,
    ack_line: Option<AckLine>,
    // Sized to the payload of the active request
    payload: BytesMut,
    // Amount of payload bytes which arrived so far
    received: usize,
    // Rows with a verified line feed
    validated_rows: usize,
    // Deadline of the current phase
    deadline: Instant,
}

impl<IO: IoAdapter> RequestStateMachine<IO> {
    pub fn new(io: IO, conf: LinkConfig) -> Self {
        RequestStateMachine::with_clock(io, MonotonicClock, conf)
    }
}

impl<IO, C> RequestStateMachine<IO, C>
where
    IO: IoAdapter,
    C: Clock,
{
    pub fn with_clock(io: IO, clock: C, conf: LinkConfig) -> Self {
        let deadline = clock.now();
        RequestStateMachine {
            io,
            clock,
            conf,
            status: RequestStatus::Idle,
            mode: RequestMode::None,
            ack: AckBuffer::default(),
            ack_line: None,
            payload: BytesMut::new(),
            received: 0,
            validated_rows: 0,
            deadline,
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Mode of the latest request
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Acknowledgment of the latest request, if one was recognized
    pub fn ack_line(&self) -> Option<&AckLine> {
        self.ack_line.as_ref()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.conf
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn into_inner(self) -> IO {
        self.io
    }

    /// Writes a request byte and starts waiting for its acknowledgment.
    /// An attempt which is still in flight gets abandoned.
    pub fn begin_request(&mut self, mode: RequestMode) -> Result<()> {
        let expected = expected_payload_bytes(mode)?;
        if self.status.in_flight() {
            log::warn!("Abandoning {} request while {}", self.mode, self.status);
        }
        self.reset();
        self.ack_line = None;
        self.mode = mode;
        self.send_request().map_err(|e| self.fail(e))?;

        self.payload.resize(expected, 0);
        self.deadline = self.clock.now() + self.conf.ack_timeout;
        self.status = RequestStatus::Requested;
        log::trace!("Requested {}, expecting {} payload bytes", mode, expected);
        Ok(())
    }

    /// Makes one read attempt and advances the state accordingly. Any error
    /// leaves the attempt in `RequestStatus::Timeout`.
    pub fn poll(&mut self) -> Result<RequestStatus> {
        let res = match self.status {
            RequestStatus::Requested => self.poll_ack(),
            RequestStatus::Arriving => self.poll_payload(),
            status => return Ok(status),
        };
        res.map_err(|e| self.fail(e))
    }

    /// Hands out a fully received payload for decoding
    pub fn take_payload(&mut self) -> Result<Bytes> {
        if self.status != RequestStatus::Received {
            return Err(Error::UnexpectedState {
                expected: RequestStatus::Received,
                actual: self.status,
            });
        }
        self.status = RequestStatus::Processing;
        Ok(self.payload.split().freeze())
    }

    /// Returns to idle once the caller is done with the payload
    pub fn finish(&mut self) {
        log::trace!("Finished {} request while {}", self.mode, self.status);
        self.reset();
    }

    /// Requests `mode` and blocks until its payload is received or the attempt fails.
    /// On success the machine is left processing, call `finish` afterwards.
    pub fn acquire(&mut self, mode: RequestMode) -> Result<Bytes> {
        self.begin_request(mode)?;
        while self.poll()? != RequestStatus::Received {}
        self.take_payload()
    }

    fn send_request(&mut self) -> Result<()> {
        let stale = self.io.discard_input(self.conf.drain_limit)?;
        if stale > 0 {
            log::warn!("Dropped {} stale bytes before requesting {}", stale, self.mode);
        }
        self.io.write_all(&self.mode.encode())
    }

    fn reset(&mut self) {
        self.status = RequestStatus::Idle;
        self.ack.clear();
        self.payload.clear();
        self.received = 0;
        self.validated_rows = 0;
    }

    fn fail(&mut self, err: Error) -> Error {
        log::debug!("{} request failed while {}: {}", self.mode, self.status, err);
        self.reset();
        self.status = RequestStatus::Timeout;
        err
    }

    fn poll_ack(&mut self) -> Result<RequestStatus> {
        let now = self.clock.now();
        if now >= self.deadline {
            return Err(Error::Timeout(Phase::Acknowledgment));
        }
        let count = self.io.read(self.ack.free_mut(), self.deadline - now)?;
        self.ack.commit(count);
        log::trace!("Read {} bytes while waiting for acknowledgment", count);

        match self.scan_ack()? {
            Some(leftover) => self.enter_arriving(leftover),
            None if self.clock.now() >= self.deadline => {
                Err(Error::Timeout(Phase::Acknowledgment))
            }
            None => Ok(self.status),
        }
    }

    /// Looks for an acknowledgment line in what was read so far, dropping
    /// lines which don't look like one and unprintable bytes in front of one.
    /// Returns the bytes following it.
    fn scan_ack(&mut self) -> Result<Option<Range<usize>>> {
        loop {
            let pending = self.ack.pending();
            match line(pending) {
                Ok((rest, body)) => {
                    let consumed = pending.len() - rest.len();
                    let (noise, text) = split_noise(body);
                    if !noise.is_empty() && is_acknowledgment(text) {
                        let noise_len = noise.len();
                        log::warn!("Discarding {} bytes of noise ahead of acknowledgment", noise_len);
                        self.ack.consume(noise_len);
                        continue;
                    }
                    if is_acknowledgment(body) {
                        let ack_line = AckLine::try_new(body)?;
                        log::debug!("{} request acknowledged with \"{}\"", self.mode, ack_line);
                        self.ack_line = Some(ack_line);
                        let range = self.ack.pending_range();
                        return Ok(Some(range.start + consumed..range.end));
                    }
                    log::warn!("Discarding {} bytes of noise before acknowledgment", consumed);
                    self.ack.consume(consumed);
                }
                Err(nom::Err::Incomplete(_)) if !self.ack.is_full() => return Ok(None),
                Err(_) => {
                    let err = match self.ack.discarded() {
                        0 => ProtocolError::AckOverflow { len: ACK_BUF_LEN },
                        discarded => ProtocolError::NoiseOverflow { discarded },
                    };
                    return Err(err.into());
                }
            }
        }
    }

    fn enter_arriving(&mut self, leftover: Range<usize>) -> Result<RequestStatus> {
        self.status = RequestStatus::Arriving;
        self.deadline = self.clock.now() + self.conf.payload_timeout;

        // Payload may have started arriving together with the acknowledgment
        let early = self.ack.bytes(leftover);
        let expected = self.payload.len();
        let count = early.len().min(expected);
        self.payload[..count].copy_from_slice(&early[..count]);
        if early.len() > expected {
            log::warn!("Dropped {} bytes past the payload", early.len() - expected);
        }
        self.received = count;
        self.ack.clear();
        self.check_payload()
    }

    fn poll_payload(&mut self) -> Result<RequestStatus> {
        let now = self.clock.now();
        if now >= self.deadline {
            return Err(Error::Timeout(Phase::Payload));
        }
        // Never read beyond the payload, anything after it belongs to no one
        let count = self
            .io
            .read(&mut self.payload[self.received..], self.deadline - now)?;
        self.received += count;
        log::trace!("Received {}/{} payload bytes", self.received, self.payload.len());

        match self.check_payload()? {
            RequestStatus::Arriving if self.clock.now() >= self.deadline => {
                Err(Error::Timeout(Phase::Payload))
            }
            status => Ok(status),
        }
    }

    /// Verifies row delimiters of newly completed rows and detects a complete payload
    fn check_payload(&mut self) -> Result<RequestStatus> {
        if self.mode.is_streaming() {
            let row_len = payload_bytes_per_row(self.mode)?;
            let stride = row_len + 1;
            while (self.validated_rows + 1) * stride <= self.received {
                let start = self.validated_rows * stride;
                let row = &self.payload[start..start + stride];
                if payload_row(row, row_len).is_err() {
                    return Err(ProtocolError::MissingRowDelimiter {
                        row: self.validated_rows,
                        found: row[row_len],
                    }
                    .into());
                }
                self.validated_rows += 1;
            }
        }
        if self.received == self.payload.len() {
            log::debug!("Received {} payload bytes for {}", self.received, self.mode);
            self.status = RequestStatus::Received;
        }
        Ok(self.status)
    }
}
