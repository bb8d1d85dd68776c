use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BookingError, BookingResult},
    models::appointment::{Appointment, AppointmentStatus},
};

/// An hourly slot label, always rendered as `HH:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(u8);

impl SlotTime {
    pub fn from_hour(hour: u8) -> BookingResult<Self> {
        if hour < 24 {
            Ok(Self(hour))
        } else {
            Err(BookingError::invalid_input(format!("hour {} is out of range", hour)))
        }
    }

    pub fn hour(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for SlotTime {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BookingError::invalid_input(format!("invalid slot time '{}', expected HH:00", s));

        let hour = s.strip_suffix(":00").ok_or_else(invalid)?;
        if hour.len() != 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        hour.parse::<u8>()
            .map_err(|_| invalid())
            .and_then(|h| Self::from_hour(h).map_err(|_| invalid()))
    }
}

impl TryFrom<String> for SlotTime {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(time: SlotTime) -> Self {
        time.to_string()
    }
}

/// Occupancy of a single slot as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Free,
    Pending,
    Accepted,
}

/// Occupied slots of one date. Absence of a time means the slot is free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMap(BTreeMap<SlotTime, Occupancy>);

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from appointment records; only pending and accepted
    /// records occupy a slot.
    pub fn from_appointments<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        let occupied = appointments
            .into_iter()
            .filter(|a| a.status.occupies_slot())
            .map(|a| (a.time, a.status.occupancy()))
            .collect();
        Self(occupied)
    }

    pub fn occupancy(&self, time: SlotTime) -> Occupancy {
        self.0.get(&time).copied().unwrap_or(Occupancy::Free)
    }

    pub fn is_free(&self, time: SlotTime) -> bool {
        self.occupancy(time) == Occupancy::Free
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A catalogue slot together with its current occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub time: SlotTime,
    pub occupancy: Occupancy,
}

impl SlotAvailability {
    pub fn is_free(&self) -> bool {
        self.occupancy == Occupancy::Free
    }
}

impl AppointmentStatus {
    pub fn occupies_slot(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Accepted)
    }

    pub fn occupancy(self) -> Occupancy {
        match self {
            AppointmentStatus::Pending => Occupancy::Pending,
            AppointmentStatus::Accepted => Occupancy::Accepted,
            AppointmentStatus::Rejected => Occupancy::Free,
        }
    }
}
