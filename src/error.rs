//! Error types for age-counter.

use thiserror::Error;

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// The form was submitted without a date.
    MissingBirthdate,
    /// The date lies after today.
    FutureBirthdate,
}

impl InvalidInput {
    /// Message shown to the user in the error notification.
    pub fn message(self) -> &'static str {
        match self {
            InvalidInput::MissingBirthdate => "Please select your date of birth",
            InvalidInput::FutureBirthdate => "Birth date cannot be in the future",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgeError {
    #[error("{}", .0.message())]
    InvalidInput(InvalidInput),
}
