use std::sync::Arc;

use eyre::eyre;
use slotbook_core::{
    errors::{BookingError, BookingResult},
    models::appointment::{Appointment, AppointmentId},
    transitions::{Confirmation, Transition, TransitionTarget},
};
use slotbook_db::AppointmentStore;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Updated(Appointment),
    Deleted(AppointmentId),
    /// A transition that needs confirmation was declined; nothing changed.
    Declined,
}

/// Applies admin transitions as single conditional store writes.
#[derive(Clone)]
pub struct StatusAuthority {
    store: Arc<dyn AppointmentStore>,
}

impl StatusAuthority {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn accept(&self, id: AppointmentId) -> BookingResult<TransitionOutcome> {
        self.apply(id, Transition::Accept, Confirmation::Confirmed).await
    }

    pub async fn reject(&self, id: AppointmentId) -> BookingResult<TransitionOutcome> {
        self.apply(id, Transition::Reject, Confirmation::Confirmed).await
    }

    pub async fn cancel(
        &self,
        id: AppointmentId,
        confirmation: Confirmation,
    ) -> BookingResult<TransitionOutcome> {
        self.apply(id, Transition::Cancel, confirmation).await
    }

    pub async fn apply(
        &self,
        id: AppointmentId,
        transition: Transition,
        confirmation: Confirmation,
    ) -> BookingResult<TransitionOutcome> {
        if transition.requires_confirmation() && confirmation == Confirmation::Declined {
            debug!("{} of {} declined by operator", transition, id);
            return Ok(TransitionOutcome::Declined);
        }

        let from = transition.source();
        let applied = match transition.target() {
            TransitionTarget::Status(to) => self
                .store
                .update_status(id, from, to)
                .await?
                .map(TransitionOutcome::Updated),
            TransitionTarget::Deleted => self
                .store
                .delete_if_status(id, from)
                .await?
                .then_some(TransitionOutcome::Deleted(id)),
        };

        match applied {
            Some(outcome) => {
                info!("Applied {} to appointment {}", transition, id);
                Ok(outcome)
            }
            None => Err(self.explain_refusal(id, transition).await),
        }
    }

    /// The conditional write matched nothing; reads the record to tell a
    /// missing record from one in the wrong status.
    async fn explain_refusal(&self, id: AppointmentId, transition: Transition) -> BookingError {
        match self.store.get(id).await {
            Ok(None) => BookingError::NotFound(format!("Appointment {} not found", id)),
            Ok(Some(current)) => match transition.apply(current.status) {
                Err(e) => e,
                // The record moved back into the source status in between.
                Ok(_) => BookingError::Store(eyre!(
                    "Appointment {} changed while applying {}",
                    id,
                    transition
                )),
            },
            Err(e) => BookingError::Store(e),
        }
    }
}
