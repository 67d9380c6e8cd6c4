//! The hardware driver interface every output channel talks through.

/// Regulation mode reported by a power module while its output is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulationMode {
    /// Constant voltage regulation mode.
    ConstantVoltage,
    /// Constant current regulation mode.
    ConstantCurrent,
}

/// One addressable power-delivery module on the shared bus.
///
/// Every call is a single bounded bus transaction. Implementations must not
/// retry on their own, the owning [`Channel`](crate::channel::Channel) decides
/// what a failure means.
pub trait PowerModule {
    type Error: core::fmt::Debug;

    /// Attempt a handshake with the module at `address`. Returns whether it answered.
    fn connect(&mut self, address: u8) -> bool;

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Set the output voltage target in volts.
    fn set_voltage_target(&mut self, voltage: f32) -> Result<(), Self::Error>;

    /// Set the output current limit in amps.
    fn set_current_target(&mut self, current: f32) -> Result<(), Self::Error>;

    /// Read back the output voltage in volts.
    fn read_voltage(&mut self) -> Result<f32, Self::Error>;

    /// Read back the output current in amps.
    fn read_current(&mut self) -> Result<f32, Self::Error>;

    fn read_mode(&mut self) -> Result<RegulationMode, Self::Error>;

    /// Move the connected module to a new bus address.
    fn set_address(&mut self, new_address: u8) -> Result<(), Self::Error>;
}
