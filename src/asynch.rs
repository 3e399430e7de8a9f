//! Async flavour of the driver, built on `embedded-io-async`.
//!
//! Frames, errors and events are shared with the blocking driver. Each
//! operation still runs a single exchange to completion before returning.

use core::fmt::Debug;

use embedded_io_async::{Error as _, ErrorKind, Read, Write};
use log::{debug, warn};

use crate::{
    autocalibration_payload, encode_command, measurement, open_transport, range_payload,
    validate_frame, Config, Error, Event, Frame, IoError, Observer, Opcode, Payload,
    SensorConfig, Silent, FRAME_LEN, PAYLOAD_LEN,
};
use crate::observer::Tap;

/// Async counterpart of [`crate::execute`].
pub async fn execute<S, O>(
    serial: &mut S,
    frame: &Frame,
    observer: &mut O,
) -> Result<Frame, IoError>
where
    S: Read + Write,
    O: Observer,
{
    let mut written = 0;
    while written < FRAME_LEN {
        match serial.write(&frame[written..]).await {
            Ok(0) => return Err(IoError::Write(ErrorKind::Other)),
            Ok(n) => written += n,
            Err(e) => return Err(IoError::Write(e.kind())),
        }
    }
    serial
        .flush()
        .await
        .map_err(|e| IoError::Write(e.kind()))?;
    observer.on_event(Event::FrameSent(frame));

    let mut reply = [0u8; FRAME_LEN];
    let mut total = 0;
    while total < FRAME_LEN {
        let count = serial
            .read(&mut reply[total..])
            .await
            .map_err(|e| IoError::Read(e.kind()))?;
        total += count;
        observer.on_event(Event::BytesRead { count, total });
    }
    observer.on_event(Event::FrameReceived(&reply));

    Ok(reply)
}

/// Async counterpart of [`crate::Mhz19b`].
///
/// # Type Parameters
///
/// * `S`: The serial transport. It must implement `embedded_io_async::Read` and `embedded_io_async::Write`.
/// * `O`: The [`Observer`] notified of frames and errors.
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
    /// Opens a session and pushes the configured settings, see [`crate::Mhz19b::open`].
    pub async fn open<F, E>(config: Config<'_>, connect: F) -> Result<Self, Error>
    where
        F: FnOnce(&str) -> Result<S, E>,
        E: Debug,
    {
        Self::open_with_observer(config, connect, Silent).await
    }
}

impl<S, O> Mhz19b<S, O>
where
    S: Read + Write,
    O: Observer,
{
    /// Same as [`Mhz19b::open`], reporting events to `observer`.
    pub async fn open_with_observer<F, E>(
        config: Config<'_>,
        connect: F,
        observer: O,
    ) -> Result<Self, Error>
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

        let SensorConfig {
            measurement_range,
            autocalibration,
        } = sensor.config;
        if let Err(e) = sensor.set_measurement_range(measurement_range).await {
            warn!("Failed to apply measurement range {} on open: {}", measurement_range, e);
        }
        if let Err(e) = sensor.set_autocalibration(autocalibration).await {
            warn!("Failed to apply autocalibration={} on open: {}", autocalibration, e);
        }

        debug!("MH-Z19B session opened on {}", config.address);
        Ok(sensor)
    }

    /// Sets the upper bound of the sensor's detection range.
    pub async fn set_measurement_range(&mut self, max: u32) -> Result<(), Error> {
        debug!("Setting measurement range to {} ppm", max);
        self.transact(Opcode::SetRange, range_payload(max)).await?;
        self.config.measurement_range = max;
        Ok(())
    }

    /// Reads the CO2 concentration in ppm.
    pub async fn get_measurement(&mut self) -> Result<u32, Error> {
        let payload = self
            .transact(Opcode::ReadMeasurement, [0; PAYLOAD_LEN])
            .await?;
        let ppm = measurement(&payload);
        debug!("CO2 concentration: {} ppm", ppm);
        Ok(ppm)
    }

    /// Enables or disables automatic baseline correction.
    pub async fn set_autocalibration(&mut self, enable: bool) -> Result<(), Error> {
        debug!("Setting autocalibration to {}", enable);
        self.transact(Opcode::SetAutocalibration, autocalibration_payload(enable))
            .await?;
        self.config.autocalibration = enable;
        Ok(())
    }

    async fn transact(&mut self, opcode: Opcode, payload: Payload) -> Result<Payload, Error> {
        let mut tap = Tap {
            debug: self.debug,
            observer: &mut self.observer,
        };
        let Some(serial) = self.serial.as_mut() else {
            tap.on_event(Event::Error(Error::InvalidState));
            return Err(Error::InvalidState);
        };

        let command = encode_command(opcode, payload);
        let result = match execute(serial, &command, &mut tap).await {
            Ok(reply) => validate_frame(&reply, opcode),
            Err(e) => Err(Error::from(e)),
        };
        if let Err(e) = result {
            tap.on_event(Event::Error(e));
        }
        result
    }
}

impl<S, O> Mhz19b<S, O> {
    /// Releases the transport. Calling `close` twice does nothing.
    pub fn close(&mut self) {
        if self.serial.take().is_some() {
            debug!("MH-Z19B session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.serial.is_some()
    }

    /// Returns the settings last acknowledged by the sensor.
    pub fn sensor_config(&self) -> SensorConfig {
        self.config
    }

    pub fn release(self) -> Option<S> {
        self.serial
    }
}
