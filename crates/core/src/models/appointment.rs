use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    catalogue,
    errors::{BookingError, BookingResult},
    models::slot::SlotTime,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| BookingError::invalid_input(format!("invalid date '{}', expected YYYY-MM-DD", s)))
}

/// Record key derived from the slot it occupies: `YYYY-MM-DD_HH:00`.
///
/// Two reservations for the same slot always address the same record, which
/// is what lets the store's conditional create arbitrate between them.
/// Ordering follows `(date, time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentId {
    date: NaiveDate,
    time: SlotTime,
}

impl AppointmentId {
    pub fn for_slot(date: NaiveDate, time: SlotTime) -> Self {
        Self { date, time }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> SlotTime {
        self.time
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date.format(DATE_FORMAT), self.time)
    }
}

impl FromStr for AppointmentId {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, time) = s
            .split_once('_')
            .ok_or_else(|| BookingError::invalid_input(format!("invalid appointment id '{}'", s)))?;
        Ok(Self::for_slot(parse_date(date)?, time.parse()?))
    }
}

impl TryFrom<String> for AppointmentId {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AppointmentId> for String {
    fn from(id: AppointmentId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Accepted => "accepted",
            AppointmentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "accepted" => Ok(AppointmentStatus::Accepted),
            "rejected" => Ok(AppointmentStatus::Rejected),
            other => Err(BookingError::invalid_input(format!("unknown status '{}'", other))),
        }
    }
}

/// A persisted appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Materializes a draft as a fresh pending record stamped at `created_at`.
    pub fn from_draft(draft: AppointmentDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: draft.id,
            date: draft.date,
            time: draft.time,
            name: draft.name,
            phone: draft.phone,
            reason: draft.reason,
            status: AppointmentStatus::Pending,
            created_at,
        }
    }
}

/// Raw reservation input as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ReservationRequest {
    /// Checks the request against the slot catalogue and `today`, producing
    /// the record the store is asked to create.
    pub fn validate(&self, today: NaiveDate) -> BookingResult<AppointmentDraft> {
        let date = parse_date(self.date.trim())?;
        let time: SlotTime = self.time.trim().parse()?;

        if date < today {
            return Err(BookingError::invalid_input(format!("{} is in the past", date)));
        }
        if !catalogue::offers(date, time) {
            return Err(BookingError::invalid_input(format!(
                "{} is not offered on {} ({})",
                time,
                date,
                date.format("%A")
            )));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(BookingError::invalid_input("name is required"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(BookingError::invalid_input("phone is required"));
        }
        let reason = self.reason.as_deref().map(str::trim).unwrap_or_default();

        Ok(AppointmentDraft {
            id: AppointmentId::for_slot(date, time),
            date,
            time,
            name: name.to_string(),
            phone: phone.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// A validated reservation, ready for the store's conditional create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub id: AppointmentId,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub name: String,
    pub phone: String,
    pub reason: String,
}
