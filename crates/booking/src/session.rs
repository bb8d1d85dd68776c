//! One client's pass through the booking flow: pick a date, watch its slots,
//! pick a slot, submit.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use slotbook_core::{
    catalogue,
    errors::{BookingError, BookingResult},
    models::{
        appointment::{Appointment, AppointmentId, DATE_FORMAT, ReservationRequest},
        slot::{SlotAvailability, SlotMap, SlotTime},
    },
};
use tracing::debug;

use crate::{
    reservation::{SlotReservationService, availability},
    view::{RealTimeView, Subscription},
};

#[derive(Debug, Default)]
struct SessionState {
    date: Option<NaiveDate>,
    slot: Option<SlotTime>,
    slots: SlotMap,
}

/// Holds at most one live subscription, for the selected date.
pub struct BookingSession {
    service: SlotReservationService,
    view: RealTimeView,
    state: Arc<RwLock<SessionState>>,
    subscription: Option<Subscription>,
}

impl BookingSession {
    pub fn new(service: SlotReservationService) -> Self {
        let view = RealTimeView::new(Arc::clone(service.store()));
        Self {
            service,
            view,
            state: Arc::new(RwLock::new(SessionState::default())),
            subscription: None,
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.read().date
    }

    pub fn selected_slot(&self) -> Option<SlotTime> {
        self.read().slot
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Switches to `date`, disposing the previous date's subscription first.
    pub async fn select_date(&mut self, date: NaiveDate) -> BookingResult<()> {
        if date < self.service.today() {
            return Err(BookingError::invalid_input(format!("{} is in the past", date)));
        }
        if !catalogue::is_open(date) {
            return Err(BookingError::invalid_input(format!(
                "The clinic is closed on {}",
                date.format("%A")
            )));
        }

        self.release();
        self.write().date = Some(date);

        let state = Arc::clone(&self.state);
        let subscribed = self
            .view
            .subscribe(date, move |slots| {
                let mut state = state.write().unwrap_or_else(PoisonError::into_inner);
                if state.date == Some(date) {
                    state.slots = slots;
                }
            })
            .await;

        match subscribed {
            Ok(subscription) => {
                debug!("Watching slots of {}", date);
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                self.write().date = None;
                Err(e)
            }
        }
    }

    /// Live availability of the selected date; empty when none is selected.
    pub fn availability(&self) -> Vec<SlotAvailability> {
        let state = self.read();
        match state.date {
            Some(date) => availability(date, &state.slots),
            None => Vec::new(),
        }
    }

    /// Only free slots of the selected date can be picked.
    pub fn select_slot(&mut self, time: SlotTime) -> BookingResult<()> {
        let mut state = self.write();
        let Some(date) = state.date else {
            return Err(BookingError::invalid_input("Select a date first"));
        };
        if !catalogue::offers(date, time) {
            return Err(BookingError::invalid_input(format!(
                "{} is not offered on {}",
                time, date
            )));
        }
        if !state.slots.is_free(time) {
            return Err(BookingError::AlreadyBooked(
                AppointmentId::for_slot(date, time).to_string(),
            ));
        }

        state.slot = Some(time);
        Ok(())
    }

    /// Reserves the selected slot. On success the session goes back to its
    /// initial state; when the slot was taken meanwhile the slot selection is
    /// cleared and the date stays watched.
    pub async fn submit(
        &mut self,
        name: &str,
        phone: &str,
        reason: Option<&str>,
    ) -> BookingResult<Appointment> {
        let (date, time) = {
            let state = self.read();
            match (state.date, state.slot) {
                (Some(date), Some(time)) => (date, time),
                _ => return Err(BookingError::invalid_input("Select a date and a slot first")),
            }
        };

        let request = ReservationRequest {
            date: date.format(DATE_FORMAT).to_string(),
            time: time.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            reason: reason.map(str::to_string),
        };

        match self.service.reserve(&request).await {
            Ok(appointment) => {
                self.release();
                Ok(appointment)
            }
            Err(e) => {
                if matches!(e, BookingError::AlreadyBooked(_)) {
                    self.write().slot = None;
                }
                Err(e)
            }
        }
    }

    pub fn back_to_calendar(&mut self) {
        self.release();
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        *self.write() = SessionState::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BookingSession {
    fn drop(&mut self) {
        self.release();
    }
}
