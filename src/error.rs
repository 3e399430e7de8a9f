use embedded_io::ErrorKind;
use thiserror::Error;

/// Failure reported by the serial transport during an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("serial write failed: {0:?}")]
    Write(ErrorKind),
    #[error("serial read failed: {0:?}")]
    Read(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),
    /// Header, opcode echo or checksum of the reply did not match.
    #[error("bad response from sensor")]
    BadResponse,
    /// The session was closed before the operation was attempted.
    #[error("sensor session is closed")]
    InvalidState,
    /// The transport could not be acquired when opening the session.
    #[error("failed to open sensor transport")]
    Transport,
}
