//! The record store contract.
//!
//! Every mutation is a single conditional operation so that the store, not
//! the caller, decides races: a create refuses to overwrite an occupying
//! record, and status updates and deletes only apply when the record is still
//! in the status the caller saw.

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use serde::{Deserialize, Serialize};
use slotbook_core::models::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus,
};
use tokio::sync::broadcast;

/// Capacity of the in-process change feed. Subscribers that fall further
/// behind than this re-read a full snapshot.
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Result of a conditional create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The draft was stored as a new pending record.
    Created(Appointment),
    /// A pending or accepted record already holds the slot.
    Occupied(Appointment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A notification on the store's change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreChange {
    Changed { id: AppointmentId, kind: ChangeKind },
    /// Changes may have been missed; every live query must re-read.
    Resync,
}

impl StoreChange {
    pub fn created(id: AppointmentId) -> Self {
        StoreChange::Changed { id, kind: ChangeKind::Created }
    }

    pub fn updated(id: AppointmentId) -> Self {
        StoreChange::Changed { id, kind: ChangeKind::Updated }
    }

    pub fn deleted(id: AppointmentId) -> Self {
        StoreChange::Changed { id, kind: ChangeKind::Deleted }
    }
}

/// Equality filter on `date`; results are always ordered by `(date, time)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub date: Option<NaiveDate>,
}

impl AppointmentQuery {
    pub fn all() -> Self {
        Self { date: None }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }

    pub fn includes(&self, appointment: &Appointment) -> bool {
        self.date.is_none_or(|d| d == appointment.date)
    }

    pub fn is_affected_by(&self, change: &StoreChange) -> bool {
        match change {
            StoreChange::Changed { id, .. } => self.date.is_none_or(|d| d == id.date()),
            StoreChange::Resync => true,
        }
    }
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Creates a pending record at `draft.id` unless a pending or accepted
    /// record is already there. A rejected record at the same key is archived
    /// to the history and replaced.
    async fn create_unless_occupied(&self, draft: AppointmentDraft) -> Result<CreateOutcome>;

    async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>>;

    /// Sets `to` only if the record currently has status `from`. Returns the
    /// updated record, or `None` when the record is missing or in another
    /// status.
    async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>>;

    /// Deletes the record only if it currently has `status`.
    async fn delete_if_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<bool>;

    async fn list(&self, query: AppointmentQuery) -> Result<Vec<Appointment>>;

    /// Rejected records that were replaced at `id`, oldest first.
    async fn history(&self, id: AppointmentId) -> Result<Vec<Appointment>>;

    /// Subscribes to the change feed. Only changes sent after this call are
    /// observed.
    fn changes(&self) -> broadcast::Receiver<StoreChange>;
}
