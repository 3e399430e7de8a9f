use crate::DEFAULT_RANGE;

/// Settings consumed when opening a sensor session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config<'a> {
    /// Device path or address handed to the transport factory, e.g. `/dev/ttyS0`.
    pub address: &'a str,
    /// Detection range in ppm pushed to the sensor on open. Zero selects the default of 5000.
    pub measurement_range: u32,
    /// Whether automatic baseline correction is enabled on open.
    pub autocalibration: bool,
    /// Log every frame and read chunk at `debug` level.
    pub debug: bool,
}

impl<'a> Config<'a> {
    /// Creates a new `Config` for the sensor reachable at `address`.
    ///
    /// # Arguments
    ///
    /// * `address` - The device path passed to the transport factory.
    ///
    /// # Returns
    ///
    /// A new `Config` with the default range, autocalibration off and debug logging off.
    pub fn new(address: &'a str) -> Config<'a> {
        Config {
            address,
            ..Config::default()
        }
    }
    /// Sets the device address for the configuration.
    pub fn address(mut self, address: &'a str) -> Self {
        self.address = address;
        self
    }
    /// Sets the detection range for the configuration.
    ///
    /// # Arguments
    ///
    /// * `range` - Upper bound of the detection range in ppm. Zero means the default.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn measurement_range(mut self, range: u32) -> Self {
        self.measurement_range = range;
        self
    }
    /// Sets whether automatic baseline correction is enabled.
    pub fn autocalibration(mut self, enabled: bool) -> Self {
        self.autocalibration = enabled;
        self
    }
    /// Sets whether frames are logged at `debug` level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    // Range actually pushed to the sensor.
    pub(crate) fn effective_range(&self) -> u32 {
        if self.measurement_range == 0 {
            DEFAULT_RANGE
        } else {
            self.measurement_range
        }
    }
}

impl Default for Config<'_> {
    /// Returns the default configuration.
    ///
    /// The default configuration has an empty address, a 5000 ppm range,
    /// autocalibration disabled and debug logging disabled.
    fn default() -> Self {
        Config {
            address: "",
            measurement_range: DEFAULT_RANGE,
            autocalibration: false,
            debug: false,
        }
    }
}

/// Sensor settings last acknowledged by the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    /// Upper bound of the detection range in ppm.
    pub measurement_range: u32,
    /// Whether automatic baseline correction is enabled.
    pub autocalibration: bool,
}

impl From<&Config<'_>> for SensorConfig {
    fn from(config: &Config<'_>) -> Self {
        SensorConfig {
            measurement_range: config.effective_range(),
            autocalibration: config.autocalibration,
        }
    }
}
