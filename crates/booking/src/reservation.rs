use std::sync::Arc;

use chrono::NaiveDate;
use slotbook_core::{
    catalogue,
    clock::Clock,
    errors::{BookingError, BookingResult},
    models::{
        appointment::{Appointment, ReservationRequest},
        slot::{SlotAvailability, SlotMap},
    },
};
use slotbook_db::{AppointmentQuery, AppointmentStore, CreateOutcome};
use tracing::info;

/// Client-facing booking operations.
#[derive(Clone)]
pub struct SlotReservationService {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl SlotReservationService {
    pub fn new(store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn AppointmentStore> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Every catalogue slot of `date` with its occupancy, read fresh from the
    /// store.
    pub async fn list_availability(&self, date: NaiveDate) -> BookingResult<Vec<SlotAvailability>> {
        let appointments = self.store.list(AppointmentQuery::for_date(date)).await?;
        Ok(availability(date, &SlotMap::from_appointments(&appointments)))
    }

    /// Validates the request and creates a pending record, unless the slot is
    /// already held. Never retries and never picks another slot.
    pub async fn reserve(&self, request: &ReservationRequest) -> BookingResult<Appointment> {
        let draft = request.validate(self.clock.today())?;
        let id = draft.id;

        match self.store.create_unless_occupied(draft).await? {
            CreateOutcome::Created(appointment) => {
                info!("Reserved slot {}", id);
                Ok(appointment)
            }
            CreateOutcome::Occupied(existing) => {
                info!("Slot {} is already {}", id, existing.status);
                Err(BookingError::AlreadyBooked(id.to_string()))
            }
        }
    }
}

/// Combines the catalogue for `date` with a slot map.
pub fn availability(date: NaiveDate, slots: &SlotMap) -> Vec<SlotAvailability> {
    catalogue::slots_for(date)
        .into_iter()
        .map(|time| SlotAvailability {
            time,
            occupancy: slots.occupancy(time),
        })
        .collect()
}
