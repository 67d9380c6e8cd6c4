//! One power output: its setpoints, its last measurements and the session with its module.
//!
//! A channel keeps working while its module is missing. Setpoints are stored
//! locally and pushed again as soon as a handshake succeeds, so anything set
//! while the module was unreachable ends up on the hardware.

use crate::module::{PowerModule, RegulationMode};

/// State of the session with the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Disconnected,
    Connected,
}

/// Read-only copy of a channel's state for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSnapshot {
    pub address: u8,
    pub connection: Connection,
    pub enabled: bool,
    pub voltage_target: f32,
    pub current_target: f32,
    pub voltage_measured: f32,
    pub current_measured: f32,
    /// Only present while the output is enabled and the module connected.
    pub mode: Option<RegulationMode>,
}

pub struct Channel<M: PowerModule> {
    module: M,
    address: u8,
    connection: Connection,
    enabled: bool,
    voltage_target: f32,
    current_target: f32,
    voltage_measured: f32,
    current_measured: f32,
    mode: Option<RegulationMode>,
    /// Current target restored by [`Channel::reset`].
    default_current: f32,
}

impl<M: PowerModule> Channel<M> {
    /// Create a channel in its reset state. Nothing is sent until the first [`Channel::tick`].
    pub fn new(module: M, address: u8, default_current: f32) -> Self {
        Self {
            module,
            address,
            connection: Connection::Disconnected,
            enabled: false,
            voltage_target: 0.0,
            current_target: default_current,
            voltage_measured: 0.0,
            current_measured: 0.0,
            mode: None,
            default_current,
        }
    }

    /// Periodic refresh.
    ///
    /// A disconnected channel makes one handshake attempt and, on success,
    /// pushes its enable state and both targets. A connected and enabled
    /// channel reads back voltage, current and regulation mode. Disabled
    /// outputs are not polled.
    pub fn tick(&mut self) {
        if self.connection == Connection::Disconnected {
            if !self.module.connect(self.address) {
                return;
            }
            log::info!(
                "module {:#04x} connected, restoring enabled={} {}V {}A",
                self.address,
                self.enabled,
                self.voltage_target,
                self.current_target
            );
            self.connection = Connection::Connected;
            if let Err(e) = self.push_settings() {
                self.drop_connection(e);
            }
            return;
        }

        if !self.enabled {
            return;
        }

        match self.read_measurements() {
            Ok((voltage, current, mode)) => {
                self.voltage_measured = voltage;
                self.current_measured = current;
                self.mode = Some(mode);
            }
            Err(e) => self.drop_connection(e),
        }
    }

    /// Store a new voltage target, already validated by the caller.
    pub fn set_voltage(&mut self, voltage: f32) {
        self.voltage_target = voltage;
        if self.connection == Connection::Connected {
            if let Err(e) = self.module.set_voltage_target(voltage) {
                self.drop_connection(e);
            }
        }
    }

    /// Store a new current target, already validated by the caller.
    pub fn set_current(&mut self, current: f32) {
        self.current_target = current;
        if self.connection == Connection::Connected {
            if let Err(e) = self.module.set_current_target(current) {
                self.drop_connection(e);
            }
        }
    }

    /// Switch the output. Both targets are pushed along with the enable state.
    ///
    /// Disabling clears the measurements right away.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if self.connection == Connection::Connected {
            if let Err(e) = self.push_settings() {
                self.drop_connection(e);
            }
        }
        if !enabled {
            self.voltage_measured = 0.0;
            self.current_measured = 0.0;
            self.mode = None;
        }
    }

    /// Move the channel to a new bus address. The session always restarts.
    ///
    /// A connected module is told its new address first. If it refuses, the
    /// channel stays on the old address.
    pub fn set_address(&mut self, address: u8) {
        if self.connection == Connection::Connected {
            match self.module.set_address(address) {
                Ok(()) => self.address = address,
                Err(e) => log::warn!(
                    "module {:#04x} refused new address {:#04x}: {:?}",
                    self.address,
                    address,
                    e
                ),
            }
        } else {
            self.address = address;
        }
        log::info!("channel now at {:#04x}, reconnecting", self.address);
        self.connection = Connection::Disconnected;
    }

    /// Output off, voltage target 0, current target back to its default.
    pub fn reset(&mut self) {
        self.set_enabled(false);
        self.set_voltage(0.0);
        self.set_current(self.default_current);
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection == Connection::Connected
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn voltage_target(&self) -> f32 {
        self.voltage_target
    }

    pub fn current_target(&self) -> f32 {
        self.current_target
    }

    pub fn voltage_measured(&self) -> f32 {
        self.voltage_measured
    }

    pub fn current_measured(&self) -> f32 {
        self.current_measured
    }

    pub fn mode(&self) -> Option<RegulationMode> {
        self.mode
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            address: self.address,
            connection: self.connection,
            enabled: self.enabled,
            voltage_target: self.voltage_target,
            current_target: self.current_target,
            voltage_measured: self.voltage_measured,
            current_measured: self.current_measured,
            mode: self.mode,
        }
    }

    fn push_settings(&mut self) -> Result<(), M::Error> {
        self.module.set_enabled(self.enabled)?;
        self.module.set_voltage_target(self.voltage_target)?;
        self.module.set_current_target(self.current_target)?;
        Ok(())
    }

    fn read_measurements(&mut self) -> Result<(f32, f32, RegulationMode), M::Error> {
        let voltage = self.module.read_voltage()?;
        let current = self.module.read_current()?;
        let mode = self.module.read_mode()?;
        Ok((voltage, current, mode))
    }

    fn drop_connection(&mut self, error: M::Error) {
        log::warn!(
            "module {:#04x} stopped answering ({:?}), will reconnect",
            self.address,
            error
        );
        self.connection = Connection::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_module::{MockModule, ModuleCall};

    fn connected_channel() -> Channel<MockModule> {
        let mut channel = Channel::new(MockModule::new(), 0x01, 0.1);
        channel.tick();
        assert!(channel.is_connected());
        channel.module_mut().clear_calls();
        channel
    }

    #[test]
    fn starts_disconnected_in_reset_state() {
        let channel = Channel::new(MockModule::new(), 0x01, 0.1);
        assert_eq!(channel.connection(), Connection::Disconnected);
        assert!(!channel.is_enabled());
        assert_eq!(channel.voltage_target(), 0.0);
        assert_eq!(channel.current_target(), 0.1);
        assert!(channel.module().calls().is_empty());
    }

    #[test]
    fn failed_handshake_does_nothing_else() {
        let mut channel = Channel::new(MockModule::absent(), 0x01, 0.1);
        channel.set_enabled(true);
        channel.tick();
        channel.tick();

        assert_eq!(channel.connection(), Connection::Disconnected);
        assert_eq!(
            channel.module().calls(),
            &[ModuleCall::Connect(0x01), ModuleCall::Connect(0x01)]
        );
    }

    #[test]
    fn handshake_resyncs_settings() {
        let mut channel = Channel::new(MockModule::absent(), 0x01, 0.1);
        channel.set_voltage(12.0);
        channel.set_current(1.5);
        channel.set_enabled(true);
        // Nothing reaches the module while disconnected.
        assert!(channel.module().calls().is_empty());

        channel.module_mut().set_present(true);
        channel.tick();

        assert!(channel.is_connected());
        assert_eq!(
            channel.module().calls(),
            &[
                ModuleCall::Connect(0x01),
                ModuleCall::SetEnabled(true),
                ModuleCall::SetVoltage(12.0),
                ModuleCall::SetCurrent(1.5),
            ]
        );
    }

    #[test]
    fn disabled_output_is_not_polled() {
        let mut channel = connected_channel();
        channel.tick();
        assert!(channel.module().calls().is_empty());
    }

    #[test]
    fn enabled_output_reads_back() {
        let mut channel = connected_channel();
        channel.set_enabled(true);
        channel
            .module_mut()
            .set_readback(4.98, 0.25, RegulationMode::ConstantCurrent);
        channel.tick();

        assert_eq!(channel.voltage_measured(), 4.98);
        assert_eq!(channel.current_measured(), 0.25);
        assert_eq!(channel.mode(), Some(RegulationMode::ConstantCurrent));
    }

    #[test]
    fn disable_zeroes_measurements_immediately() {
        let mut channel = connected_channel();
        channel.set_enabled(true);
        channel
            .module_mut()
            .set_readback(5.0, 1.0, RegulationMode::ConstantVoltage);
        channel.tick();
        assert_eq!(channel.voltage_measured(), 5.0);

        channel.set_enabled(false);
        assert_eq!(channel.voltage_measured(), 0.0);
        assert_eq!(channel.current_measured(), 0.0);
        assert_eq!(channel.mode(), None);
    }

    #[test]
    fn disable_zeroes_measurements_while_disconnected() {
        let mut channel = connected_channel();
        channel.set_enabled(true);
        channel
            .module_mut()
            .set_readback(5.0, 1.0, RegulationMode::ConstantVoltage);
        channel.tick();
        channel.set_address(0x09);

        channel.set_enabled(false);
        assert_eq!(channel.voltage_measured(), 0.0);
        assert_eq!(channel.current_measured(), 0.0);
    }

    #[test]
    fn enable_pushes_targets() {
        let mut channel = connected_channel();
        channel.set_voltage(3.3);
        channel.set_enabled(true);

        assert_eq!(
            channel.module().calls(),
            &[
                ModuleCall::SetVoltage(3.3),
                ModuleCall::SetEnabled(true),
                ModuleCall::SetVoltage(3.3),
                ModuleCall::SetCurrent(0.1),
            ]
        );
    }

    #[test]
    fn targets_forwarded_only_when_connected() {
        let mut channel = Channel::new(MockModule::absent(), 0x01, 0.1);
        channel.set_voltage(7.0);
        channel.set_current(0.7);
        assert!(channel.module().calls().is_empty());
        assert_eq!(channel.voltage_target(), 7.0);
        assert_eq!(channel.current_target(), 0.7);

        let mut channel = connected_channel();
        channel.set_voltage(7.0);
        channel.set_current(0.7);
        assert_eq!(
            channel.module().calls(),
            &[ModuleCall::SetVoltage(7.0), ModuleCall::SetCurrent(0.7)]
        );
    }

    #[test]
    fn address_change_restarts_session() {
        let mut channel = connected_channel();
        channel.set_voltage(9.0);
        channel.set_enabled(true);
        channel.set_address(0x05);

        assert_eq!(channel.connection(), Connection::Disconnected);
        assert_eq!(channel.address(), 0x05);
        assert_eq!(channel.module().count(ModuleCall::SetAddress(0x05)), 1);

        channel.module_mut().clear_calls();
        channel.tick();
        channel.tick();

        let module = channel.module();
        assert_eq!(module.count(ModuleCall::Connect(0x05)), 1);
        assert_eq!(module.count(ModuleCall::SetEnabled(true)), 1);
        assert_eq!(module.count(ModuleCall::SetVoltage(9.0)), 1);
        assert_eq!(module.count(ModuleCall::SetCurrent(0.1)), 1);
    }

    #[test]
    fn address_change_while_disconnected_only_retargets() {
        let mut channel = Channel::new(MockModule::absent(), 0x01, 0.1);
        channel.set_address(0x03);
        assert_eq!(channel.address(), 0x03);
        assert!(channel.module().calls().is_empty());

        channel.tick();
        assert_eq!(channel.module().calls(), &[ModuleCall::Connect(0x03)]);
    }

    #[test]
    fn refused_address_change_keeps_old_address() {
        let mut channel = connected_channel();
        channel.module_mut().set_failing(true);
        channel.set_address(0x05);

        assert_eq!(channel.address(), 0x01);
        assert_eq!(channel.connection(), Connection::Disconnected);
    }

    #[test]
    fn bus_failure_drops_connection() {
        let mut channel = connected_channel();
        channel.set_enabled(true);
        channel.module_mut().set_failing(true);
        channel.tick();
        assert_eq!(channel.connection(), Connection::Disconnected);

        channel.module_mut().set_failing(false);
        channel.module_mut().clear_calls();
        channel.tick();
        assert!(channel.is_connected());
        assert_eq!(channel.module().count(ModuleCall::SetEnabled(true)), 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut channel = connected_channel();
        channel.set_voltage(20.0);
        channel.set_current(2.0);
        channel.set_enabled(true);
        channel
            .module_mut()
            .set_readback(20.0, 2.0, RegulationMode::ConstantVoltage);
        channel.tick();

        channel.reset();
        assert!(!channel.is_enabled());
        assert_eq!(channel.voltage_target(), 0.0);
        assert_eq!(channel.current_target(), 0.1);
        assert_eq!(channel.voltage_measured(), 0.0);
        assert_eq!(channel.current_measured(), 0.0);
        assert_eq!(channel.module().count(ModuleCall::SetVoltage(0.0)), 1);
    }
}
