//! Process-wide selection state: the addressed output and the step sizes.

use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

use crate::{config::SupplyConfig, error::ScpiError};

/// Number of outputs on the supply.
pub const CHANNEL_COUNT: usize = Output::COUNT;

/// One of the supply outputs. Only existing outputs can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumCountMacro)]
#[repr(u8)]
pub enum Output {
    #[default]
    One = 0,
    Two = 1,
}

impl Output {
    /// 0-based position in the channel array.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 1-based number as used on the command surface.
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// From the 1-based output number.
impl TryFrom<u32> for Output {
    type Error = ScpiError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Output::One),
            2 => Ok(Output::Two),
            _ => Err(ScpiError::DataOutOfRange),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentRegister {
    selected: Output,
    voltage_step: f32,
    current_step: f32,
    voltage_step_default: f32,
    current_step_default: f32,
}

impl InstrumentRegister {
    /// Output one selected, both steps at their configured defaults.
    pub fn new(config: &SupplyConfig) -> Self {
        Self {
            selected: Output::One,
            voltage_step: config.voltage_step_default,
            current_step: config.current_step_default,
            voltage_step_default: config.voltage_step_default,
            current_step_default: config.current_step_default,
        }
    }

    pub fn selected(&self) -> Output {
        self.selected
    }

    pub fn select(&mut self, output: Output) {
        self.selected = output;
    }

    pub fn voltage_step(&self) -> f32 {
        self.voltage_step
    }

    pub fn current_step(&self) -> f32 {
        self.current_step
    }

    /// Step size, already validated by the caller.
    pub fn set_voltage_step(&mut self, step: f32) {
        self.voltage_step = step;
    }

    /// Step size, already validated by the caller.
    pub fn set_current_step(&mut self, step: f32) {
        self.current_step = step;
    }

    pub fn voltage_step_default(&self) -> f32 {
        self.voltage_step_default
    }

    pub fn current_step_default(&self) -> f32 {
        self.current_step_default
    }

    pub fn reset(&mut self) {
        self.selected = Output::One;
        self.voltage_step = self.voltage_step_default;
        self.current_step = self.current_step_default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn output_numbers() {
        for (index, output) in Output::iter().enumerate() {
            assert_eq!(output.index(), index);
            assert_eq!(Output::try_from(output.number() as u32), Ok(output));
        }
        assert_eq!(Output::try_from(0), Err(ScpiError::DataOutOfRange));
        assert_eq!(Output::try_from(3), Err(ScpiError::DataOutOfRange));
        assert_eq!(CHANNEL_COUNT, 2);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut register = InstrumentRegister::new(&SupplyConfig::default());
        assert_eq!(register.selected(), Output::One);
        assert_eq!(register.voltage_step(), 1.0);
        assert_eq!(register.current_step(), 0.1);

        register.select(Output::Two);
        register.set_voltage_step(0.5);
        register.set_current_step(0.01);
        register.reset();

        assert_eq!(register.selected(), Output::One);
        assert_eq!(register.voltage_step(), 1.0);
        assert_eq!(register.current_step(), 0.1);
    }
}
