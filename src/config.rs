//! Supply-wide configuration: electrical limits, defaults, bus addresses and timing.

use thiserror::Error;

use crate::instrument::CHANNEL_COUNT;

/// Millisecond timestamp fed to [`Supply::poll`](crate::supply::Supply::poll).
pub type Instant = fugit::TimerInstantU64<1000>;

/// Millisecond duration used for all timing configuration.
pub type Duration = fugit::MillisDurationU64;

/// Lowest usable unit address on the module bus.
pub const MIN_ADDRESS: u8 = 1;
/// Highest usable unit address on the module bus.
pub const MAX_ADDRESS: u8 = 247;

/// Use [`SupplyConfigBuilder`] to create a validated configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyConfig {
    /// Upper output voltage limit in volts.
    pub max_voltage: f32,
    /// Upper output current limit in amps.
    pub max_current: f32,
    /// Voltage selected by the `DEFault` token of APPLy.
    pub default_voltage: f32,
    /// Current selected by the `DEFault` token of APPLy, also the current target after reset.
    pub default_current: f32,
    pub voltage_step_default: f32,
    pub current_step_default: f32,
    /// Bus address of each output module, in output order.
    pub addresses: [u8; CHANNEL_COUNT],
    /// Cadence of connection and measurement refresh.
    pub refresh_interval: Duration,
    /// Minimum time between two handshake attempts on a disconnected channel.
    pub reconnect_interval: Duration,
    /// Per-transaction timeout the bus transport should be opened with.
    pub bus_timeout: Duration,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        SupplyConfig {
            max_voltage: 30.0,
            max_current: 5.0,
            default_voltage: 1.0,
            default_current: 0.1,
            voltage_step_default: 1.0,
            current_step_default: 0.1,
            addresses: [0x01, 0x02],
            refresh_interval: Duration::millis(100),
            reconnect_interval: Duration::millis(100),
            bus_timeout: Duration::millis(300),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Voltage and current limits must be positive")]
    InvalidLimit,
    #[error("Default value outside of the output limits")]
    DefaultOutOfRange,
    #[error("Step size must be positive and within the output limits")]
    StepOutOfRange,
    #[error("Bus address {0} is not usable")]
    InvalidAddress(u8),
    #[error("Bus address {0} assigned to more than one output")]
    DuplicateAddress(u8),
    #[error("Intervals must be non-zero")]
    InvalidInterval,
}

/// Use this type to create a [`SupplyConfig`].
#[derive(Debug, Default)]
pub struct SupplyConfigBuilder {
    config: SupplyConfig,
}

impl SupplyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set voltage and current limits.
    pub fn with_limits(mut self, max_voltage: f32, max_current: f32) -> Self {
        self.config.max_voltage = max_voltage;
        self.config.max_current = max_current;
        self
    }

    /// Set values for the `DEFault` token.
    pub fn with_defaults(mut self, voltage: f32, current: f32) -> Self {
        self.config.default_voltage = voltage;
        self.config.default_current = current;
        self
    }

    /// Set default step sizes for relative adjustments.
    pub fn with_steps(mut self, voltage_step: f32, current_step: f32) -> Self {
        self.config.voltage_step_default = voltage_step;
        self.config.current_step_default = current_step;
        self
    }

    pub fn with_addresses(mut self, addresses: [u8; CHANNEL_COUNT]) -> Self {
        self.config.addresses = addresses;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    pub fn with_bus_timeout(mut self, timeout: Duration) -> Self {
        self.config.bus_timeout = timeout;
        self
    }

    /// Let's build it!
    pub fn build(self) -> Result<SupplyConfig, ConfigError> {
        let c = self.config;

        if !(c.max_voltage > 0.0 && c.max_current > 0.0) {
            return Err(ConfigError::InvalidLimit);
        }
        if !(0.0..=c.max_voltage).contains(&c.default_voltage)
            || !(0.0..=c.max_current).contains(&c.default_current)
        {
            return Err(ConfigError::DefaultOutOfRange);
        }
        if !(c.voltage_step_default > 0.0 && c.voltage_step_default <= c.max_voltage)
            || !(c.current_step_default > 0.0 && c.current_step_default <= c.max_current)
        {
            return Err(ConfigError::StepOutOfRange);
        }
        for (i, &address) in c.addresses.iter().enumerate() {
            if !(MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
                return Err(ConfigError::InvalidAddress(address));
            }
            if c.addresses[..i].contains(&address) {
                return Err(ConfigError::DuplicateAddress(address));
            }
        }
        let zero = Duration::millis(0);
        if c.refresh_interval == zero || c.reconnect_interval == zero {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(c)
    }
}
