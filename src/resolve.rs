//! Turns a numeric-or-symbolic parameter into a validated setpoint.

use crate::{
    error::ScpiError,
    params::{Number, Numeric, Token, Unit},
};

/// Tokens accepted when setting a voltage or current level.
pub const LEVEL_TOKENS: &[Token] = &[Token::Minimum, Token::Maximum, Token::Up, Token::Down];
/// Tokens accepted when setting a step size.
pub const STEP_TOKENS: &[Token] = &[Token::Default];
/// Tokens accepted by both APPLy values.
pub const APPLY_TOKENS: &[Token] = &[Token::Minimum, Token::Maximum, Token::Default];
/// Tokens accepted by level queries.
pub const LIMIT_QUERY_TOKENS: &[Token] = &[Token::Minimum, Token::Maximum];
/// Tokens accepted when selecting an output.
pub const OUTPUT_TOKENS: &[Token] = &[Token::Output1, Token::Output2];

/// The electrical quantity a parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
    Current,
}

impl Quantity {
    /// The only unit suffix accepted besides none.
    pub const fn unit(self) -> Unit {
        match self {
            Quantity::Voltage => Unit::Volt,
            Quantity::Current => Unit::Ampere,
        }
    }
}

/// Resolution rules for one parameter.
///
/// Relative tokens are range checked like literals, a step past a limit is
/// rejected rather than clamped.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    quantity: Quantity,
    limit: f64,
    default: Option<f64>,
    /// Present setting and step size for `UP`/`DOWN`, summed in the
    /// precision the setting is stored in.
    relative: Option<(f32, f32)>,
    positive: bool,
}

impl Resolver {
    /// Values resolve into `0..=limit`.
    pub fn new(quantity: Quantity, limit: f32) -> Self {
        Self {
            quantity,
            limit: limit as f64,
            default: None,
            relative: None,
            positive: false,
        }
    }

    /// Value of the `DEFault` token.
    pub fn with_default(mut self, default: f32) -> Self {
        self.default = Some(default as f64);
        self
    }

    /// Enable `UP`/`DOWN` relative to `setting`.
    pub fn with_relative(mut self, setting: f32, step: f32) -> Self {
        self.relative = Some((setting, step));
        self
    }

    /// Reject zero as well.
    pub fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub fn resolve(&self, number: &Number) -> Result<f64, ScpiError> {
        if number.unit != Unit::None && number.unit != self.quantity.unit() {
            return Err(ScpiError::InvalidSuffix);
        }

        let value = match number.value {
            Numeric::Value(value) => value,
            Numeric::Special(token) => self.token_value(token)?,
        };

        let in_range = if self.positive {
            value > 0.0 && value <= self.limit
        } else {
            (0.0..=self.limit).contains(&value)
        };
        if in_range {
            Ok(value)
        } else {
            Err(ScpiError::DataOutOfRange)
        }
    }

    fn token_value(&self, token: Token) -> Result<f64, ScpiError> {
        match (token, self.relative) {
            (Token::Minimum, _) => Ok(0.0),
            (Token::Maximum, _) => Ok(self.limit),
            (Token::Default, _) => self.default.ok_or(ScpiError::IllegalParameterValue),
            (Token::Up, Some((setting, step))) => Ok((setting + step) as f64),
            (Token::Down, Some((setting, step))) => Ok((setting - step) as f64),
            _ => Err(ScpiError::IllegalParameterValue),
        }
    }
}
