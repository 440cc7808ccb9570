use arduvision::{
    config::{F_H, LF},
    hex_parser::parse_hex_str,
    Clock, IoAdapter, RequestMode, Result,
};
use lazy_static::lazy_static;
use manifest_dir_macros::exist_relative_path;
use mockall::mock;
use std::{
    cell::Cell,
    collections::VecDeque,
    io::{Read, Write},
    rc::Rc,
    time::{Duration, Instant},
};

lazy_static! {
    pub static ref TRACK_BRIGHT_CAPTURE: Vec<u8> = {
        let hex_str = include_str!(exist_relative_path!(
            "../resources/test/track_bright_example.txt"
        ));
        let (_, data) = parse_hex_str(hex_str)
            .expect("Failed to parse resources/test/track_bright_example.txt");
        data
    };
    pub static ref STREAM_8PPB_CAPTURE: Vec<u8> = {
        let hex_str = include_str!(exist_relative_path!(
            "../resources/test/stream_8ppb_example.txt"
        ));
        let (_, data) = parse_hex_str(hex_str)
            .expect("Failed to parse resources/test/stream_8ppb_example.txt");
        data
    };
}

mock! {
    pub IO {}
    impl Read for IO {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    }
    impl Write for IO {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;
        fn flush(&mut self) -> std::io::Result<()>;
    }
}

/// Streaming payload of `mode` with every data byte set to `fill`
pub fn stream_payload(mode: RequestMode, fill: u8) -> Vec<u8> {
    let row_len = mode.param();
    (0..F_H)
        .flat_map(|_| std::iter::repeat(fill).take(row_len).chain([LF]))
        .collect()
}

/// Clock which only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct SimClock {
    base: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for SimClock {
    fn default() -> Self {
        SimClock {
            base: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }
}

impl SimClock {
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }
}

struct Chunk {
    // Time until the chunk arrives, counted from the previous one
    after: Duration,
    data: Vec<u8>,
}

/// Camera stand-in driven by a script of responses. Each write releases the
/// next queued response. Waiting for input moves the shared `SimClock`
/// instead of sleeping.
pub struct ScriptedIO {
    clock: SimClock,
    replies: VecDeque<Vec<Chunk>>,
    pending: VecDeque<Chunk>,
    written: Vec<u8>,
}

impl ScriptedIO {
    pub fn new(clock: SimClock) -> Self {
        ScriptedIO {
            clock,
            replies: VecDeque::new(),
            pending: VecDeque::new(),
            written: Vec::new(),
        }
    }

    /// Bytes already waiting on the line before anything is written
    pub fn stale(mut self, data: &[u8]) -> Self {
        self.pending.push_back(Chunk {
            after: Duration::ZERO,
            data: data.to_vec(),
        });
        self
    }

    /// Queues a response arriving at once after the next unanswered write
    pub fn reply(self, data: &[u8]) -> Self {
        self.reply_in_chunks([(Duration::ZERO, data)])
    }

    /// Queues a response split into chunks, each with its delay after the previous one
    pub fn reply_in_chunks<'a>(mut self, chunks: impl IntoIterator<Item = (Duration, &'a [u8])>) -> Self {
        self.replies.push_back(
            chunks
                .into_iter()
                .map(|(after, data)| Chunk {
                    after,
                    data: data.to_vec(),
                })
                .collect(),
        );
        self
    }

    /// Queues a request which is never answered
    pub fn silence(mut self) -> Self {
        self.replies.push_back(Vec::new());
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }
}

impl IoAdapter for ScriptedIO {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.written.extend_from_slice(buf);
        if let Some(reply) = self.replies.pop_front() {
            self.pending.extend(reply);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let chunk = match self.pending.front_mut() {
            Some(chunk) if chunk.after <= timeout => chunk,
            Some(chunk) => {
                chunk.after -= timeout;
                self.clock.advance(timeout);
                return Ok(0);
            }
            None => {
                self.clock.advance(timeout);
                return Ok(0);
            }
        };
        self.clock.advance(chunk.after);
        chunk.after = Duration::ZERO;

        let count = buf.len().min(chunk.data.len());
        buf[..count].copy_from_slice(&chunk.data[..count]);
        chunk.data.drain(..count);
        if chunk.data.is_empty() {
            self.pending.pop_front();
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_are_loaded() {
        assert_eq!(&TRACK_BRIGHT_CAPTURE[..], b"OK\r\n\x00\x2A");
        assert_eq!(STREAM_8PPB_CAPTURE.len(), 3 + 11 * F_H);
    }

    #[test]
    fn replies_follow_writes() {
        let clock = SimClock::default();
        let mut io = ScriptedIO::new(clock.clone())
            .reply_in_chunks([(Duration::ZERO, &b"OK\n"[..]), (Duration::from_millis(5), &b"ab"[..])]);
        let mut buf = [0u8; 8];

        assert_eq!(io.read(&mut buf, Duration::from_millis(10)).unwrap(), 0);
        assert_eq!(clock.elapsed(), Duration::from_millis(10));

        io.write_all(&[0x01]).unwrap();
        assert_eq!(io.read(&mut buf, Duration::from_millis(10)).unwrap(), 3);
        assert_eq!(io.read(&mut buf, Duration::from_millis(2)).unwrap(), 0);
        assert_eq!(io.read(&mut buf, Duration::from_millis(10)).unwrap(), 2);
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(clock.elapsed(), Duration::from_millis(15));
        assert_eq!(io.written(), &[0x01]);
    }
}
