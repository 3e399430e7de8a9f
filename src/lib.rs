#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;

use embedded_io::{Read, Write};
use log::{debug, warn};

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod observer;
use observer::Tap;
pub use observer::*;

mod transaction;
pub use transaction::*;

#[cfg(feature = "async")]
pub mod asynch;

/// Represents a session with an MH-Z19B CO2 sensor.
///
/// The session owns the serial transport from `open` until `close`. Every
/// operation is a single request/response exchange; once closed, all of them
/// fail with [`Error::InvalidState`] without touching the transport.
///
/// # Type Parameters
///
/// * `S`: The serial transport. It must implement `embedded_io::Read` and `embedded_io::Write`.
/// * `O`: The [`Observer`] notified of frames and errors. Defaults to [`Silent`].
pub struct Mhz19b<S, O = Silent> {
    serial: Option<S>,
    config: SensorConfig,
    debug: bool,
    observer: O,
}

impl<S> Mhz19b<S>
where
    S: Read + Write,
{
    /// Opens a session and pushes the configured range and autocalibration setting to the sensor.
    ///
    /// # Arguments
    ///
    /// * `config`: The configuration. A zero `measurement_range` is replaced by 5000.
    /// * `connect`: Acquires the transport for `config.address`.
    ///
    /// # Returns
    ///
    /// * `Ok(Mhz19b)` once the transport is acquired. Failures while pushing the
    ///   initial configuration are logged and reported to the observer but do not
    ///   fail the open; the session starts out holding the requested settings.
    /// * `Err(Error::Transport)` if `connect` fails.
    pub fn open<F, E>(config: Config<'_>, connect: F) -> Result<Self, Error>
    where
        F: FnOnce(&str) -> Result<S, E>,
        E: Debug,
    {
        Self::open_with_observer(config, connect, Silent)
    }
}

impl<S, O> Mhz19b<S, O>
where
    S: Read + Write,
    O: Observer,
{
    /// Same as [`Mhz19b::open`], reporting events to `observer`.
    pub fn open_with_observer<F, E>(config: Config<'_>, connect: F, observer: O) -> Result<Self, Error>
    where
        F: FnOnce(&str) -> Result<S, E>,
        E: Debug,
    {
        let serial = open_transport(&config, connect)?;
        let mut sensor = Self {
            serial: Some(serial),
            config: SensorConfig::from(&config),
            debug: config.debug,
            observer,
        };

        // Best-effort: the sensor stays usable even if it rejects the initial settings.
        let SensorConfig {
            measurement_range,
            autocalibration,
        } = sensor.config;
        if let Err(e) = sensor.set_measurement_range(measurement_range) {
            warn!("Failed to apply measurement range {} on open: {}", measurement_range, e);
        }
        if let Err(e) = sensor.set_autocalibration(autocalibration) {
            warn!("Failed to apply autocalibration={} on open: {}", autocalibration, e);
        }

        debug!("MH-Z19B session opened on {}", config.address);
        Ok(sensor)
    }

    /// Sets the upper bound of the sensor's detection range.
    ///
    /// Only the low 16 bits of `max` are sent. No bounds check is made; the
    /// MH-Z19B accepts 2000 and 5000.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the sensor acknowledged the change.
    /// * `Err(Error)` on a closed session, a transport failure or a bad reply.
    pub fn set_measurement_range(&mut self, max: u32) -> Result<(), Error> {
        debug!("Setting measurement range to {} ppm", max);
        self.transact(Opcode::SetRange, range_payload(max))?;
        self.config.measurement_range = max;
        Ok(())
    }

    /// Reads the CO2 concentration in ppm.
    pub fn get_measurement(&mut self) -> Result<u32, Error> {
        let payload = self.transact(Opcode::ReadMeasurement, [0; PAYLOAD_LEN])?;
        let ppm = measurement(&payload);
        debug!("CO2 concentration: {} ppm", ppm);
        Ok(ppm)
    }

    /// Enables or disables automatic baseline correction.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the sensor acknowledged the change.
    /// * `Err(Error)` on a closed session, a transport failure or a bad reply.
    pub fn set_autocalibration(&mut self, enable: bool) -> Result<(), Error> {
        debug!("Setting autocalibration to {}", enable);
        self.transact(Opcode::SetAutocalibration, autocalibration_payload(enable))?;
        self.config.autocalibration = enable;
        Ok(())
    }

    fn transact(&mut self, opcode: Opcode, payload: Payload) -> Result<Payload, Error> {
        let mut tap = Tap {
            debug: self.debug,
            observer: &mut self.observer,
        };
        let Some(serial) = self.serial.as_mut() else {
            tap.on_event(Event::Error(Error::InvalidState));
            return Err(Error::InvalidState);
        };

        let command = encode_command(opcode, payload);
        let result = execute(serial, &command, &mut tap)
            .map_err(Error::from)
            .and_then(|reply| validate_frame(&reply, opcode));
        if let Err(e) = result {
            tap.on_event(Event::Error(e));
        }
        result
    }
}

impl<S, O> Mhz19b<S, O> {
    /// Releases the transport. Later operations fail with [`Error::InvalidState`].
    ///
    /// Calling `close` on a closed session does nothing.
    pub fn close(&mut self) {
        if self.serial.take().is_some() {
            debug!("MH-Z19B session closed");
        }
    }

    /// Returns `true` until the session is closed.
    pub fn is_open(&self) -> bool {
        self.serial.is_some()
    }

    /// Returns the settings last acknowledged by the sensor.
    pub fn sensor_config(&self) -> SensorConfig {
        self.config
    }

    /// Consumes the session and hands back the transport, if it was not closed.
    pub fn release(self) -> Option<S> {
        self.serial
    }
}

pub(crate) fn open_transport<S, F, E>(config: &Config<'_>, connect: F) -> Result<S, Error>
where
    F: FnOnce(&str) -> Result<S, E>,
    E: Debug,
{
    if config.debug {
        debug!(
            "Opening MH-Z19B at {:?}, range {} ppm, autocalibration {}",
            config.address,
            config.effective_range(),
            config.autocalibration
        );
    }
    connect(config.address).map_err(|e| {
        log::error!("Failed to open transport {:?}: {:?}", config.address, e);
        Error::Transport
    })
}

// SetRange carries the range big-endian in the last two payload bytes.
pub(crate) fn range_payload(max: u32) -> Payload {
    let [_, _, high, low] = max.to_be_bytes();
    [0x00, 0x00, 0x00, high, low]
}

pub(crate) fn autocalibration_payload(enable: bool) -> Payload {
    [if enable { ABC_ON } else { ABC_OFF }, 0x00, 0x00, 0x00, 0x00]
}

pub(crate) fn measurement(payload: &Payload) -> u32 {
    u32::from(u16::from_be_bytes([payload[0], payload[1]]))
}
