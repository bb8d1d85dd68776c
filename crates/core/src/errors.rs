use serde::Serialize;
use thiserror::Error;

use crate::{models::appointment::AppointmentStatus, transitions::Transition};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot already booked: {0}")]
    AlreadyBooked(String),

    #[error("Invalid transition: cannot {transition} an appointment that is {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        transition: Transition,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Coarse advice for a failed booking or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    /// The slot is taken; pick another one after re-reading availability.
    TryDifferentSlot,
    /// The store could not be reached; the same request may succeed later.
    TryAgain,
    /// The request itself is wrong.
    FixInput,
}

impl BookingError {
    pub fn guidance(&self) -> Guidance {
        match self {
            BookingError::AlreadyBooked(_) => Guidance::TryDifferentSlot,
            BookingError::Store(_) => Guidance::TryAgain,
            BookingError::NotFound(_)
            | BookingError::InvalidInput(_)
            | BookingError::InvalidTransition { .. }
            | BookingError::Authentication(_) => Guidance::FixInput,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        BookingError::InvalidInput(message.into())
    }
}
