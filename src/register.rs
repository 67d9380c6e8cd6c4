//! Register map of the bus-attached power modules.

use strum_macros::EnumIter;

use crate::module::RegulationMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u16)]
pub enum ModuleRegister {
    /// __R/W__ - Voltage setting.
    ///
    /// Raw value in units of the voltage resolution, see [`ScalingFactors`](crate::scaling::ScalingFactors).
    VoltageSet = 0x00,
    /// __R/W__ - Current setting.
    CurrentSet = 0x01,
    /// __R__ - Output voltage readback.
    VoltageOut = 0x02,
    /// __R__ - Output current readback.
    CurrentOut = 0x03,
    /// __R__ - Regulation state.
    /// * `0` - CV.
    /// * `1` - CC.
    Regulation = 0x11,
    /// __R/W__ - Output switch.
    /// * `0` - Off.
    /// * `1` - On.
    OutputEnable = 0x12,
    /// __R__ - Product model. Only used as a presence probe.
    Model = 0x16,
    /// __R/W__ - Unit address of the module on the bus.
    UnitAddress = 0x18,
}

impl From<ModuleRegister> for u16 {
    fn from(value: ModuleRegister) -> Self {
        value as u16
    }
}

impl From<RegulationMode> for u16 {
    fn from(value: RegulationMode) -> Self {
        match value {
            RegulationMode::ConstantVoltage => 0x00,
            RegulationMode::ConstantCurrent => 0x01,
        }
    }
}

impl TryFrom<u16> for RegulationMode {
    type Error = ();
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(RegulationMode::ConstantVoltage),
            0x01 => Ok(RegulationMode::ConstantCurrent),
            _ => Err(()),
        }
    }
}
