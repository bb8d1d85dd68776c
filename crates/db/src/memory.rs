//! In-process appointment store.
//!
//! All records live behind one write lock, so the check and the write of a
//! conditional create happen in the same critical section. Change
//! notifications are sent before the lock is released, which keeps the feed
//! in the same order as the writes.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use eyre::Result;
use slotbook_core::{
    clock::{Clock, SystemClock},
    models::appointment::{Appointment, AppointmentDraft, AppointmentId, AppointmentStatus},
};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::store::{
    AppointmentQuery, AppointmentStore, CHANGE_FEED_CAPACITY, CreateOutcome, StoreChange,
};

#[derive(Default)]
struct Tables {
    appointments: BTreeMap<AppointmentId, Appointment>,
    history: Vec<Appointment>,
}

pub struct MemoryAppointmentStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::default()))
    }

    /// Uses `clock` to stamp `createdAt` on new records.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
            changes,
        }
    }

    fn publish(&self, change: StoreChange) {
        // No receivers is fine; nobody is watching yet.
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryAppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn create_unless_occupied(&self, draft: AppointmentDraft) -> Result<CreateOutcome> {
        let mut tables = self.tables.write().await;
        let id = draft.id;

        if let Some(existing) = tables.appointments.get(&id) {
            if existing.status.occupies_slot() {
                debug!("Slot {} already held by a {} record", id, existing.status);
                return Ok(CreateOutcome::Occupied(existing.clone()));
            }
        }

        if let Some(rejected) = tables.appointments.remove(&id) {
            debug!("Archiving rejected record {} before rebooking", id);
            tables.history.push(rejected);
        }

        let appointment = Appointment::from_draft(draft, self.clock.now());
        tables.appointments.insert(id, appointment.clone());
        self.publish(StoreChange::created(id));

        debug!("Created appointment {}", id);
        Ok(CreateOutcome::Created(appointment))
    }

    async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let mut tables = self.tables.write().await;

        let Some(record) = tables.appointments.get_mut(&id).filter(|r| r.status == from) else {
            return Ok(None);
        };
        record.status = to;
        let updated = record.clone();
        self.publish(StoreChange::updated(id));

        debug!("Appointment {} moved from {} to {}", id, from, to);
        Ok(Some(updated))
    }

    async fn delete_if_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if !tables.appointments.get(&id).is_some_and(|r| r.status == status) {
            return Ok(false);
        }
        tables.appointments.remove(&id);
        self.publish(StoreChange::deleted(id));

        debug!("Deleted appointment {}", id);
        Ok(true)
    }

    async fn list(&self, query: AppointmentQuery) -> Result<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let appointments = tables
            .appointments
            .values()
            .filter(|a| query.includes(a))
            .cloned()
            .collect();

        Ok(appointments)
    }

    async fn history(&self, id: AppointmentId) -> Result<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let archived = tables.history.iter().filter(|a| a.id == id).cloned().collect();

        Ok(archived)
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
