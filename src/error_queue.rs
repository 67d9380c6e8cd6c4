//! The error sink the command router reports into, and a bounded queue implementing it.

use crate::error::ScpiError;

/// Anything that accepts command errors.
///
/// The protocol engine owns the real queue; handlers only ever push.
pub trait ErrorSink {
    fn push_error(&mut self, error: ScpiError);
}

/// Bounded FIFO of pending errors.
///
/// When the queue is full the newest entry is replaced with
/// [`ScpiError::QueueOverflow`], so the oldest errors are kept.
#[derive(Debug, Default)]
pub struct ErrorQueue<const N: usize = 16> {
    queue: heapless::Deque<ScpiError, N>,
}

impl<const N: usize> ErrorQueue<N> {
    pub const fn new() -> Self {
        Self {
            queue: heapless::Deque::new(),
        }
    }

    /// Pop the oldest error.
    pub fn next(&mut self) -> Option<ScpiError> {
        self.queue.pop_front()
    }

    /// Number of pending errors.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Error number and message as read back by a "next error" query.
    pub fn code_and_message(error: Option<ScpiError>) -> (i16, &'static str) {
        match error {
            Some(ScpiError::DataTypeError) => (ScpiError::DataTypeError.code(), "Data type error"),
            Some(ScpiError::ParameterNotAllowed) => {
                (ScpiError::ParameterNotAllowed.code(), "Parameter not allowed")
            }
            Some(ScpiError::MissingParameter) => {
                (ScpiError::MissingParameter.code(), "Missing parameter")
            }
            Some(ScpiError::InvalidSuffix) => (ScpiError::InvalidSuffix.code(), "Invalid suffix"),
            Some(ScpiError::CharacterDataTooLong) => (
                ScpiError::CharacterDataTooLong.code(),
                "Character data too long",
            ),
            Some(ScpiError::DataOutOfRange) => {
                (ScpiError::DataOutOfRange.code(), "Data out of range")
            }
            Some(ScpiError::IllegalParameterValue) => (
                ScpiError::IllegalParameterValue.code(),
                "Illegal parameter value",
            ),
            Some(ScpiError::QueueOverflow) => (ScpiError::QueueOverflow.code(), "Queue overflow"),
            None => (0, "No error"),
        }
    }
}

impl<const N: usize> ErrorSink for ErrorQueue<N> {
    fn push_error(&mut self, error: ScpiError) {
        if let Err(rejected) = self.queue.push_back(error) {
            log::debug!("error queue full, dropping {:?}", rejected);
            if let Some(newest) = self.queue.back_mut() {
                *newest = ScpiError::QueueOverflow;
            }
        }
    }
}
