use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use slotbook_core::models::{
    appointment::{Appointment, AppointmentId, AppointmentStatus},
    slot::SlotTime,
};
use sqlx::FromRow;

/// Row shape shared by `appointments` and `appointment_history`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let id: AppointmentId = row
            .id
            .parse()
            .wrap_err_with(|| format!("Corrupt appointment id in store: {}", row.id))?;
        let time: SlotTime = row
            .time
            .parse()
            .wrap_err_with(|| format!("Corrupt slot time for {}: {}", row.id, row.time))?;
        let status: AppointmentStatus = row
            .status
            .parse()
            .wrap_err_with(|| format!("Corrupt status for {}: {}", row.id, row.status))?;

        Ok(Appointment {
            id,
            date: row.date,
            time,
            name: row.name,
            phone: row.phone,
            reason: row.reason,
            status,
            created_at: row.created_at,
        })
    }
}

pub fn into_appointments(rows: Vec<DbAppointment>) -> Result<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}
