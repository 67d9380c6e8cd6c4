//! Our error types, both for the command surface and for the module bus.

use thiserror::Error;

pub type BusResult<T, I> = core::result::Result<T, Error<I>>;

/// Errors a command handler reports to the error queue.
///
/// Numeric codes follow SCPI-99 / IEEE 488.2, see [`ScpiError::code`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScpiError {
    #[error("Data type error")]
    DataTypeError,
    #[error("Parameter not allowed")]
    ParameterNotAllowed,
    #[error("Missing parameter")]
    MissingParameter,
    #[error("Invalid suffix")]
    InvalidSuffix,
    #[error("Character data too long")]
    CharacterDataTooLong,
    #[error("Data out of range")]
    DataOutOfRange,
    #[error("Illegal parameter value")]
    IllegalParameterValue,
    #[error("Queue overflow")]
    QueueOverflow,
}

impl ScpiError {
    /// Standard SCPI error number.
    pub const fn code(self) -> i16 {
        match self {
            ScpiError::DataTypeError => -104,
            ScpiError::ParameterNotAllowed => -108,
            ScpiError::MissingParameter => -109,
            ScpiError::InvalidSuffix => -131,
            ScpiError::CharacterDataTooLong => -144,
            ScpiError::DataOutOfRange => -222,
            ScpiError::IllegalParameterValue => -224,
            ScpiError::QueueOverflow => -350,
        }
    }
}

/// Error type for power module communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    SerialError(I),
    #[error("Modbus protocol error: {0}")]
    ModbusError(rmodbus::ErrorKind),
    #[error("Invalid range")]
    InvalidRange,
    #[error("Invalid response received")]
    InvalidResponse,
    #[error("Frame buffer too small")]
    BufferError,
}

impl<I: embedded_io::Error> From<rmodbus::ErrorKind> for Error<I> {
    fn from(err: rmodbus::ErrorKind) -> Self {
        Error::ModbusError(err)
    }
}
