//! Command handlers.
//!
//! [`Supply::execute`] is the single entry point from the grammar engine. Every
//! handler validates all of its parameters before touching any state, so a
//! rejected command never has a partial effect. Rejections are pushed to the
//! error sink once and handed back to the caller.

use crate::{
    command::Command,
    config::{MAX_ADDRESS, MIN_ADDRESS},
    error::ScpiError,
    error_queue::ErrorSink,
    instrument::Output,
    module::PowerModule,
    params::{Number, Numeric, Parameters, Token, Unit},
    resolve::{
        APPLY_TOKENS, LEVEL_TOKENS, LIMIT_QUERY_TOKENS, OUTPUT_TOKENS, Quantity, Resolver,
        STEP_TOKENS,
    },
    supply::Supply,
};

/// Result value of a command, formatted by the grammar engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Commands without a result.
    Empty,
    Bool(bool),
    UInt(u32),
    Float(f32),
    FloatPair([f32; 2]),
}

fn required<T>(value: Option<T>) -> Result<T, ScpiError> {
    value.ok_or(ScpiError::MissingParameter)
}

fn output_from_token(token: Token) -> Result<Output, ScpiError> {
    match token {
        Token::Output1 => Ok(Output::One),
        Token::Output2 => Ok(Output::Two),
        _ => Err(ScpiError::IllegalParameterValue),
    }
}

impl<M: PowerModule> Supply<M> {
    /// Run one command against the supply.
    pub fn execute<P, E>(
        &mut self,
        command: Command,
        params: &mut P,
        errors: &mut E,
    ) -> Result<Response, ScpiError>
    where
        P: Parameters + ?Sized,
        E: ErrorSink + ?Sized,
    {
        let result = if params.remaining() > command.max_params() {
            Err(ScpiError::ParameterNotAllowed)
        } else {
            self.dispatch(command, params)
        };

        if let Err(error) = result {
            log::debug!("{} rejected: {}", command.pattern(), error);
            errors.push_error(error);
        }
        result
    }

    fn dispatch<P: Parameters + ?Sized>(
        &mut self,
        command: Command,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        use Command as C;

        match command {
            C::Reset => {
                self.reset();
                Ok(Response::Empty)
            }
            C::SelfTestQuery => Ok(Response::UInt(self.self_test().into())),
            C::Local | C::Remote | C::RwLock => Ok(Response::Empty),
            C::BeeperState => self.set_beeper(params),
            C::BeeperStateQuery => Ok(Response::Bool(self.panel.beeper_enabled())),
            C::BeepImmediate => {
                self.panel.beep();
                Ok(Response::Empty)
            }
            C::DisplayTextClear => {
                self.panel.clear_text();
                Ok(Response::Empty)
            }
            C::DisplayText => self.set_display_text(params),
            C::DisplayBrightness => self.set_brightness(params),
            C::DisplayEnable => self.set_display_enabled(params),
            C::InstrumentSelect => self.select(params),
            C::InstrumentNSelect => self.select_by_number(params),
            C::InstrumentSelectQuery | C::InstrumentNSelectQuery => {
                Ok(Response::UInt(self.register.selected().number() as u32))
            }
            C::Voltage => self.set_level(Quantity::Voltage, params),
            C::VoltageQuery => self.query_level(Quantity::Voltage, params),
            C::VoltageStep => self.set_step(Quantity::Voltage, params),
            C::VoltageStepQuery => self.query_step(Quantity::Voltage, params),
            C::Current => self.set_level(Quantity::Current, params),
            C::CurrentQuery => self.query_level(Quantity::Current, params),
            C::CurrentStep => self.set_step(Quantity::Current, params),
            C::CurrentStepQuery => self.query_step(Quantity::Current, params),
            C::Apply => self.apply(params),
            C::ApplyQuery => {
                let channel = self.selected_channel();
                Ok(Response::FloatPair([
                    channel.voltage_target(),
                    channel.current_target(),
                ]))
            }
            C::Output => self.set_output(params),
            C::OutputQuery => Ok(Response::Bool(self.selected_channel().is_enabled())),
            C::MeasureVoltage => Ok(Response::Float(self.selected_channel().voltage_measured())),
            C::MeasureCurrent => Ok(Response::Float(self.selected_channel().current_measured())),
            C::MeasurePower => {
                let channel = self.selected_channel();
                Ok(Response::Float(
                    channel.voltage_measured() * channel.current_measured(),
                ))
            }
            C::Address => self.set_address(params),
        }
    }

    fn limit(&self, quantity: Quantity) -> f32 {
        match quantity {
            Quantity::Voltage => self.config.max_voltage,
            Quantity::Current => self.config.max_current,
        }
    }

    fn step(&self, quantity: Quantity) -> (f32, f32) {
        match quantity {
            Quantity::Voltage => (
                self.register.voltage_step(),
                self.register.voltage_step_default(),
            ),
            Quantity::Current => (
                self.register.current_step(),
                self.register.current_step_default(),
            ),
        }
    }

    fn set_level<P: Parameters + ?Sized>(
        &mut self,
        quantity: Quantity,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let number = required(params.number(LEVEL_TOKENS, true)?)?;
        let channel = self.selected_channel();
        let (step, _) = self.step(quantity);
        let setting = match quantity {
            Quantity::Voltage => channel.voltage_target(),
            Quantity::Current => channel.current_target(),
        };
        let value = Resolver::new(quantity, self.limit(quantity))
            .with_relative(setting, step)
            .resolve(&number)? as f32;

        let channel = self.selected_channel_mut();
        match quantity {
            Quantity::Voltage => channel.set_voltage(value),
            Quantity::Current => channel.set_current(value),
        }
        Ok(Response::Empty)
    }

    fn query_level<P: Parameters + ?Sized>(
        &self,
        quantity: Quantity,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let value = match params.choice(LIMIT_QUERY_TOKENS, false)? {
            Some(Token::Minimum) => 0.0,
            Some(Token::Maximum) => self.limit(quantity),
            _ => {
                let channel = self.selected_channel();
                match quantity {
                    Quantity::Voltage => channel.voltage_target(),
                    Quantity::Current => channel.current_target(),
                }
            }
        };
        Ok(Response::Float(value))
    }

    fn set_step<P: Parameters + ?Sized>(
        &mut self,
        quantity: Quantity,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let number = required(params.number(STEP_TOKENS, true)?)?;
        let (_, default) = self.step(quantity);
        let step = Resolver::new(quantity, self.limit(quantity))
            .with_default(default)
            .positive()
            .resolve(&number)? as f32;

        match quantity {
            Quantity::Voltage => self.register.set_voltage_step(step),
            Quantity::Current => self.register.set_current_step(step),
        }
        Ok(Response::Empty)
    }

    fn query_step<P: Parameters + ?Sized>(
        &self,
        quantity: Quantity,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let (step, default) = self.step(quantity);
        match params.choice(STEP_TOKENS, false)? {
            Some(Token::Default) => Ok(Response::Float(default)),
            _ => Ok(Response::Float(step)),
        }
    }

    /// `APPLy <voltage>[,<current>[,<output>]]`, strictly positional.
    fn apply<P: Parameters + ?Sized>(&mut self, params: &mut P) -> Result<Response, ScpiError> {
        let voltage = required(params.number(APPLY_TOKENS, true)?)?;
        let current = params.number(APPLY_TOKENS, false)?;
        let output = match params.choice(OUTPUT_TOKENS, false)? {
            Some(token) => Some(output_from_token(token)?),
            None => None,
        };

        let voltage = Resolver::new(Quantity::Voltage, self.config.max_voltage)
            .with_default(self.config.default_voltage)
            .resolve(&voltage)? as f32;
        let current = match current {
            Some(current) => Some(
                Resolver::new(Quantity::Current, self.config.max_current)
                    .with_default(self.config.default_current)
                    .resolve(&current)? as f32,
            ),
            None => None,
        };

        if let Some(output) = output {
            self.register.select(output);
        }
        let channel = self.selected_channel_mut();
        channel.set_voltage(voltage);
        if let Some(current) = current {
            channel.set_current(current);
        }
        Ok(Response::Empty)
    }

    fn select<P: Parameters + ?Sized>(&mut self, params: &mut P) -> Result<Response, ScpiError> {
        let number = required(params.number(OUTPUT_TOKENS, true)?)?;
        let output = match number {
            Number {
                value: Numeric::Special(token),
                ..
            } => output_from_token(token)?,
            Number {
                value: Numeric::Value(value),
                unit: Unit::None,
            } => output_from_value(value)?,
            Number { .. } => return Err(ScpiError::InvalidSuffix),
        };
        self.register.select(output);
        Ok(Response::Empty)
    }

    fn select_by_number<P: Parameters + ?Sized>(
        &mut self,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let number = required(params.uint32(true)?)?;
        let output = Output::try_from(number)?;
        self.register.select(output);
        Ok(Response::Empty)
    }

    fn set_output<P: Parameters + ?Sized>(&mut self, params: &mut P) -> Result<Response, ScpiError> {
        let enabled = required(params.boolean(true)?)?;
        self.selected_channel_mut().set_enabled(enabled);
        Ok(Response::Empty)
    }

    fn set_address<P: Parameters + ?Sized>(&mut self, params: &mut P) -> Result<Response, ScpiError> {
        let address = required(params.uint32(true)?)?;
        let address = u8::try_from(address)
            .ok()
            .filter(|a| (MIN_ADDRESS..=MAX_ADDRESS).contains(a))
            .ok_or(ScpiError::DataOutOfRange)?;
        self.selected_channel_mut().set_address(address);
        Ok(Response::Empty)
    }

    fn set_beeper<P: Parameters + ?Sized>(&mut self, params: &mut P) -> Result<Response, ScpiError> {
        let enabled = required(params.boolean(true)?)?;
        self.panel.set_beeper_enabled(enabled);
        Ok(Response::Empty)
    }

    fn set_display_text<P: Parameters + ?Sized>(
        &mut self,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let text = required(params.characters(true)?)?;
        self.panel.set_text(text)?;
        Ok(Response::Empty)
    }

    fn set_brightness<P: Parameters + ?Sized>(
        &mut self,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let brightness = required(params.double(true)?)?;
        if !(0.0..=1.0).contains(&brightness) {
            return Err(ScpiError::DataOutOfRange);
        }
        self.panel.set_brightness(brightness as f32);
        Ok(Response::Empty)
    }

    fn set_display_enabled<P: Parameters + ?Sized>(
        &mut self,
        params: &mut P,
    ) -> Result<Response, ScpiError> {
        let enabled = required(params.boolean(true)?)?;
        self.panel.set_brightness(if enabled { 1.0 } else { 0.0 });
        Ok(Response::Empty)
    }
}

fn output_from_value(value: f64) -> Result<Output, ScpiError> {
    if value == 1.0 {
        Ok(Output::One)
    } else if value == 2.0 {
        Ok(Output::Two)
    } else {
        Err(ScpiError::DataOutOfRange)
    }
}
