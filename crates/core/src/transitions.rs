//! Admin-side status transitions.
//!
//! ```text
//! pending --accept--> accepted --cancel--> (deleted)
//! pending --reject--> rejected
//! ```
//!
//! Nothing leaves `rejected` or the deleted state, and nothing skips
//! `pending`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BookingError, BookingResult},
    models::appointment::AppointmentStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Accept,
    Reject,
    Cancel,
}

/// Where a transition leaves the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    Status(AppointmentStatus),
    Deleted,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Accept => "accept",
            Transition::Reject => "reject",
            Transition::Cancel => "cancel",
        }
    }

    /// The only status this transition may start from.
    pub fn source(self) -> AppointmentStatus {
        match self {
            Transition::Accept | Transition::Reject => AppointmentStatus::Pending,
            Transition::Cancel => AppointmentStatus::Accepted,
        }
    }

    pub fn target(self) -> TransitionTarget {
        match self {
            Transition::Accept => TransitionTarget::Status(AppointmentStatus::Accepted),
            Transition::Reject => TransitionTarget::Status(AppointmentStatus::Rejected),
            Transition::Cancel => TransitionTarget::Deleted,
        }
    }

    /// Cancelling is irreversible and frees the slot, so the operator has to
    /// confirm it explicitly.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, Transition::Cancel)
    }

    pub fn apply(self, from: AppointmentStatus) -> BookingResult<TransitionTarget> {
        if from == self.source() {
            Ok(self.target())
        } else {
            Err(BookingError::InvalidTransition {
                from,
                transition: self,
            })
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator answer to the cancellation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}
