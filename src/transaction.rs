use embedded_io::{Error as _, ErrorKind, Read, Write};

use crate::{Event, Frame, IoError, Observer, FRAME_LEN};

/// Performs one request/response exchange over `serial`.
///
/// Writes the whole of `frame`, then reads until exactly nine bytes have been
/// accumulated. Reads may return any number of bytes, zero included; the loop
/// only ends on a full frame or a transport error. Nothing is retried and no
/// timeout is applied here, so a silent sensor blocks for as long as the
/// transport's own read timeout allows.
///
/// The reply is returned unvalidated.
pub fn execute<S, O>(serial: &mut S, frame: &Frame, observer: &mut O) -> Result<Frame, IoError>
where
    S: Read + Write,
    O: Observer,
{
    let mut written = 0;
    while written < FRAME_LEN {
        match serial.write(&frame[written..]) {
            Ok(0) => return Err(IoError::Write(ErrorKind::Other)),
            Ok(n) => written += n,
            Err(e) => return Err(IoError::Write(e.kind())),
        }
    }
    serial.flush().map_err(|e| IoError::Write(e.kind()))?;
    observer.on_event(Event::FrameSent(frame));

    let mut reply = [0u8; FRAME_LEN];
    let mut total = 0;
    while total < FRAME_LEN {
        let count = serial
            .read(&mut reply[total..])
            .map_err(|e| IoError::Read(e.kind()))?;
        total += count;
        observer.on_event(Event::BytesRead { count, total });
    }
    observer.on_event(Event::FrameReceived(&reply));

    Ok(reply)
}
