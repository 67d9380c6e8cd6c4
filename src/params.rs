//! Typed command parameters, as handed over by the protocol engine.
//!
//! The engine splits a command line into parameters and tags numbers with
//! their unit. Handlers pull parameters in order through [`Parameters`],
//! stating which symbolic tokens they accept at that position.

use core::str::FromStr;

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::error::ScpiError;

/// Unit suffix attached to a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// No suffix.
    #[default]
    None,
    Volt,
    Ampere,
    Watt,
    /// Any other recognised suffix.
    Other,
}

/// Symbolic values accepted in place of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Token {
    #[strum(serialize = "MIN", serialize = "MINIMUM")]
    Minimum,
    #[strum(serialize = "MAX", serialize = "MAXIMUM")]
    Maximum,
    #[strum(serialize = "DEF", serialize = "DEFAULT")]
    Default,
    #[strum(serialize = "UP")]
    Up,
    #[strum(serialize = "DOWN")]
    Down,
    #[strum(serialize = "OUT1", serialize = "OUTPUT1")]
    Output1,
    #[strum(serialize = "OUT2", serialize = "OUTPUT2")]
    Output2,
}

/// A numeric parameter: a literal or one of the allowed tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Value(f64),
    Special(Token),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub value: Numeric,
    pub unit: Unit,
}

impl Number {
    pub const fn value(value: f64, unit: Unit) -> Self {
        Self {
            value: Numeric::Value(value),
            unit,
        }
    }

    pub const fn special(token: Token) -> Self {
        Self {
            value: Numeric::Special(token),
            unit: Unit::None,
        }
    }
}

/// Sequential access to the parameters of one command.
///
/// Every getter consumes one parameter. An absent optional parameter is
/// `Ok(None)`, an absent mandatory one is [`ScpiError::MissingParameter`].
pub trait Parameters {
    /// Numeric parameter, or one of `choices`.
    fn number(&mut self, choices: &[Token], mandatory: bool) -> Result<Option<Number>, ScpiError>;

    /// One of `choices`, no numbers.
    fn choice(&mut self, choices: &[Token], mandatory: bool) -> Result<Option<Token>, ScpiError>;

    fn boolean(&mut self, mandatory: bool) -> Result<Option<bool>, ScpiError>;

    /// Unsigned integer without unit.
    fn uint32(&mut self, mandatory: bool) -> Result<Option<u32>, ScpiError>;

    /// Plain number without unit.
    fn double(&mut self, mandatory: bool) -> Result<Option<f64>, ScpiError>;

    /// String or character data.
    fn characters(&mut self, mandatory: bool) -> Result<Option<&str>, ScpiError>;

    /// Number of parameters not yet consumed.
    fn remaining(&self) -> usize;
}

/// Maximum parameters per command.
pub const MAX_PARAMS: usize = 4;
/// Maximum length of a string or mnemonic parameter.
pub const MAX_TEXT: usize = 48;

/// One already tokenized parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Number(f64, Unit),
    Mnemonic(heapless::String<MAX_TEXT>),
    Text(heapless::String<MAX_TEXT>),
    Bool(bool),
}

/// In-memory [`Parameters`] over a fixed list.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    items: heapless::Vec<Param, MAX_PARAMS>,
    cursor: usize,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Fails when the list is full.
    pub fn push(&mut self, param: Param) -> Result<(), Param> {
        self.items.push(param)
    }

    pub fn with_number(self, value: f64, unit: Unit) -> Self {
        self.with(Param::Number(value, unit))
    }

    /// Character data, e.g. `MAX` or `OUT2`. Overlong text is truncated.
    pub fn with_mnemonic(self, mnemonic: &str) -> Self {
        self.with(Param::Mnemonic(truncated(mnemonic)))
    }

    /// Quoted string data. Overlong text is truncated.
    pub fn with_text(self, text: &str) -> Self {
        self.with(Param::Text(truncated(text)))
    }

    pub fn with_bool(self, value: bool) -> Self {
        self.with(Param::Bool(value))
    }

    fn with(mut self, param: Param) -> Self {
        if self.items.push(param).is_err() {
            log::warn!("more than {} parameters, extra dropped", MAX_PARAMS);
        }
        self
    }

    fn next(&mut self, mandatory: bool) -> Result<Option<&Param>, ScpiError> {
        match self.items.get(self.cursor) {
            Some(param) => {
                self.cursor += 1;
                Ok(Some(param))
            }
            None if mandatory => Err(ScpiError::MissingParameter),
            None => Ok(None),
        }
    }
}

fn truncated(text: &str) -> heapless::String<MAX_TEXT> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn match_token(mnemonic: &str, choices: &[Token]) -> Result<Token, ScpiError> {
    Token::from_str(mnemonic)
        .ok()
        .filter(|token| choices.contains(token))
        .ok_or(ScpiError::IllegalParameterValue)
}

impl Parameters for ParamList {
    fn number(&mut self, choices: &[Token], mandatory: bool) -> Result<Option<Number>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Number(value, unit)) => Ok(Some(Number::value(*value, *unit))),
            Some(Param::Mnemonic(m)) => match_token(m, choices).map(|t| Some(Number::special(t))),
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn choice(&mut self, choices: &[Token], mandatory: bool) -> Result<Option<Token>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Mnemonic(m)) => match_token(m, choices).map(Some),
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn boolean(&mut self, mandatory: bool) -> Result<Option<bool>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Bool(value)) => Ok(Some(*value)),
            Some(Param::Number(value, Unit::None)) => Ok(Some(*value != 0.0)),
            Some(Param::Mnemonic(m)) if m.eq_ignore_ascii_case("ON") => Ok(Some(true)),
            Some(Param::Mnemonic(m)) if m.eq_ignore_ascii_case("OFF") => Ok(Some(false)),
            Some(Param::Mnemonic(_)) => Err(ScpiError::IllegalParameterValue),
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn uint32(&mut self, mandatory: bool) -> Result<Option<u32>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Number(_, unit)) if *unit != Unit::None => Err(ScpiError::InvalidSuffix),
            Some(Param::Number(value, _)) => {
                if *value < 0.0 || *value > u32::MAX as f64 {
                    Err(ScpiError::DataOutOfRange)
                } else if *value != (*value as u32) as f64 {
                    Err(ScpiError::DataTypeError)
                } else {
                    Ok(Some(*value as u32))
                }
            }
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn double(&mut self, mandatory: bool) -> Result<Option<f64>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Number(_, unit)) if *unit != Unit::None => Err(ScpiError::InvalidSuffix),
            Some(Param::Number(value, _)) => Ok(Some(*value)),
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn characters(&mut self, mandatory: bool) -> Result<Option<&str>, ScpiError> {
        match self.next(mandatory)? {
            None => Ok(None),
            Some(Param::Text(s)) | Some(Param::Mnemonic(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ScpiError::DataTypeError),
        }
    }

    fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }
}
