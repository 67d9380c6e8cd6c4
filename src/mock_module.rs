//! We use this mocking module in unit tests to stand in for a power module.

use crate::module::{PowerModule, RegulationMode};

/// One call made against the module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleCall {
    Connect(u8),
    SetEnabled(bool),
    SetVoltage(f32),
    SetCurrent(f32),
    ReadVoltage,
    ReadCurrent,
    ReadMode,
    SetAddress(u8),
}

#[derive(Debug)]
pub struct MockModuleError;

/// Records every call and answers with configurable readbacks.
pub struct MockModule {
    calls: heapless::Vec<ModuleCall, 64>,
    /// Whether a handshake succeeds.
    present: bool,
    /// Whether transfers after the handshake fail.
    failing: bool,
    voltage: f32,
    current: f32,
    mode: RegulationMode,
}

impl MockModule {
    /// A module that answers the handshake.
    pub fn new() -> Self {
        Self {
            calls: heapless::Vec::new(),
            present: true,
            failing: false,
            voltage: 0.0,
            current: 0.0,
            mode: RegulationMode::ConstantVoltage,
        }
    }

    /// A module that never answers the handshake.
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn set_readback(&mut self, voltage: f32, current: f32, mode: RegulationMode) {
        self.voltage = voltage;
        self.current = current;
        self.mode = mode;
    }

    pub fn calls(&self) -> &[ModuleCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls equal to `call`.
    pub fn count(&self, call: ModuleCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    fn record(&mut self, call: ModuleCall) -> Result<(), MockModuleError> {
        self.calls.push(call).expect("mock call log full");
        if self.failing {
            Err(MockModuleError)
        } else {
            Ok(())
        }
    }
}

impl PowerModule for MockModule {
    type Error = MockModuleError;

    fn connect(&mut self, address: u8) -> bool {
        self.calls
            .push(ModuleCall::Connect(address))
            .expect("mock call log full");
        self.present
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.record(ModuleCall::SetEnabled(enabled))
    }

    fn set_voltage_target(&mut self, voltage: f32) -> Result<(), Self::Error> {
        self.record(ModuleCall::SetVoltage(voltage))
    }

    fn set_current_target(&mut self, current: f32) -> Result<(), Self::Error> {
        self.record(ModuleCall::SetCurrent(current))
    }

    fn read_voltage(&mut self) -> Result<f32, Self::Error> {
        self.record(ModuleCall::ReadVoltage)?;
        Ok(self.voltage)
    }

    fn read_current(&mut self) -> Result<f32, Self::Error> {
        self.record(ModuleCall::ReadCurrent)?;
        Ok(self.current)
    }

    fn read_mode(&mut self) -> Result<RegulationMode, Self::Error> {
        self.record(ModuleCall::ReadMode)?;
        Ok(self.mode)
    }

    fn set_address(&mut self, new_address: u8) -> Result<(), Self::Error> {
        self.record(ModuleCall::SetAddress(new_address))
    }
}
