use crate::{Error, Frame};

/// Something that happened while talking to the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A command frame was fully written to the transport.
    FrameSent(&'a Frame),
    /// A read returned `count` bytes, bringing the reply to `total` bytes.
    BytesRead { count: usize, total: usize },
    /// A complete 9-byte reply was accumulated, before validation.
    FrameReceived(&'a Frame),
    /// An operation failed with `Error`.
    Error(Error),
}

/// Receives [`Event`]s from a sensor session.
///
/// Any `FnMut(Event)` closure is an observer.
pub trait Observer {
    fn on_event(&mut self, event: Event<'_>);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Observer for Silent {
    fn on_event(&mut self, _event: Event<'_>) {}
}

impl<F> Observer for F
where
    F: FnMut(Event<'_>),
{
    fn on_event(&mut self, event: Event<'_>) {
        self(event)
    }
}

// Forwards events to the session observer, logging them first when debug output is on.
pub(crate) struct Tap<'o, O> {
    pub(crate) debug: bool,
    pub(crate) observer: &'o mut O,
}

impl<O: Observer> Observer for Tap<'_, O> {
    fn on_event(&mut self, event: Event<'_>) {
        if self.debug {
            match event {
                Event::FrameSent(frame) => log::debug!("Sent frame: {:02X?}", frame),
                Event::BytesRead { count, total } => {
                    log::debug!("Read {} bytes ({}/{})", count, total, crate::FRAME_LEN)
                }
                Event::FrameReceived(frame) => log::debug!("Received frame: {:02X?}", frame),
                Event::Error(e) => log::debug!("Exchange failed: {}", e),
            }
        }
        self.observer.on_event(event);
    }
}
