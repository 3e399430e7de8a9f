#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_io::{ErrorKind, ErrorType};
use mhz19b_nostd_rs::{encode_response, Error, Event, Frame, Opcode, FRAME_LEN};

pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::max())
        .is_test(true)
        .try_init();
}

#[derive(Debug)]
pub struct PortError(pub ErrorKind);

impl embedded_io::Error for PortError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Simulated sensor behind a serial port.
///
/// Every complete 9-byte command is answered with an acknowledgement, or the
/// CO2 reading for `0x86`, unless a scripted reply is queued. Replies lose
/// their last `short_by` bytes and are handed out `chunk` bytes per read.
/// Reading with nothing pending fails with `TimedOut`, like a port with a
/// read timeout.
pub struct FakeSensor {
    pub co2: u16,
    pub chunk: usize,
    pub written: Vec<u8>,
    pub pending: VecDeque<u8>,
    pub scripted: VecDeque<Frame>,
    pub short_by: usize,
    pub reads: usize,
    pub writes: usize,
}

impl FakeSensor {
    pub fn new(co2: u16) -> Rc<RefCell<FakeSensor>> {
        Rc::new(RefCell::new(FakeSensor {
            co2,
            chunk: FRAME_LEN,
            written: Vec::new(),
            pending: VecDeque::new(),
            scripted: VecDeque::new(),
            short_by: 0,
            reads: 0,
            writes: 0,
        }))
    }

    /// Commands received so far, one frame each.
    pub fn commands(&self) -> Vec<Frame> {
        self.written
            .chunks_exact(FRAME_LEN)
            .map(|c| c.try_into().unwrap())
            .collect()
    }

    fn answer(&mut self, command: &[u8]) {
        let reply = self.scripted.pop_front().unwrap_or_else(|| match command[2] {
            0x86 => {
                let [high, low] = self.co2.to_be_bytes();
                encode_response(Opcode::ReadMeasurement, [high, low, 0x40, 0x00, 0x00])
            }
            0x99 => encode_response(Opcode::SetRange, [0; 5]),
            0x79 => encode_response(Opcode::SetAutocalibration, [0; 5]),
            other => panic!("unexpected opcode {:02X}", other),
        });
        self.pending.extend(&reply[..FRAME_LEN - self.short_by]);
    }
}

pub struct Port(pub Rc<RefCell<FakeSensor>>);

impl ErrorType for Port {
    type Error = PortError;
}

impl embedded_io::Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut sensor = self.0.borrow_mut();
        sensor.reads += 1;
        if sensor.pending.is_empty() {
            return Err(PortError(ErrorKind::TimedOut));
        }
        let n = buf.len().min(sensor.chunk).min(sensor.pending.len());
        for (slot, byte) in buf.iter_mut().zip(sensor.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl embedded_io::Write for Port {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut sensor = self.0.borrow_mut();
        sensor.writes += 1;
        for &byte in buf {
            sensor.written.push(byte);
            if sensor.written.len() % FRAME_LEN == 0 {
                let start = sensor.written.len() - FRAME_LEN;
                let command = sensor.written[start..].to_vec();
                sensor.answer(&command);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(feature = "async")]
impl embedded_io_async::Read for Port {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        embedded_io::Read::read(self, buf)
    }
}

#[cfg(feature = "async")]
impl embedded_io_async::Write for Port {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(self, buf)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Owned copy of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Sent(Frame),
    Read { count: usize, total: usize },
    Received(Frame),
    Failed(Error),
}

pub type SeenLog = Rc<RefCell<Vec<Seen>>>;

pub fn recorder() -> (SeenLog, impl FnMut(Event<'_>)) {
    let seen: SeenLog = Rc::default();
    let sink = seen.clone();
    let observer = move |event: Event<'_>| {
        sink.borrow_mut().push(match event {
            Event::FrameSent(frame) => Seen::Sent(*frame),
            Event::BytesRead { count, total } => Seen::Read { count, total },
            Event::FrameReceived(frame) => Seen::Received(*frame),
            Event::Error(e) => Seen::Failed(e),
        })
    };
    (seen, observer)
}
