use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use slotbook_core::{
    errors::BookingResult,
    models::appointment::{Appointment, AppointmentId, AppointmentStatus},
    transitions::{Confirmation, Transition},
};
use slotbook_db::AppointmentStore;
use tracing::{error, info};

use crate::{
    authority::{StatusAuthority, TransitionOutcome},
    notify::{Notifier, Permission, announce_new_requests},
    view::{RealTimeView, Subscription},
};

/// Which records the admin list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Pending,
    Accepted,
    All,
}

impl StatusFilter {
    pub fn matches(self, appointment: &Appointment) -> bool {
        match self {
            StatusFilter::Pending => appointment.status == AppointmentStatus::Pending,
            StatusFilter::Accepted => appointment.status == AppointmentStatus::Accepted,
            StatusFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub accepted: usize,
    pub all: usize,
}

impl StatusCounts {
    pub fn of(appointments: &[Appointment]) -> Self {
        let count = |status: AppointmentStatus| {
            appointments.iter().filter(|a| a.status == status).count()
        };
        Self {
            pending: count(AppointmentStatus::Pending),
            accepted: count(AppointmentStatus::Accepted),
            all: appointments.len(),
        }
    }
}

#[derive(Debug, Default)]
struct Board {
    appointments: Vec<Appointment>,
    /// Pending count of the last snapshot; `None` until the first one.
    pending: Option<usize>,
}

impl Board {
    /// Stores the snapshot and returns how many pending requests were added
    /// since the previous one.
    fn refresh(&mut self, appointments: Vec<Appointment>) -> Option<usize> {
        let pending = StatusCounts::of(&appointments).pending;
        let previous = self.pending.replace(pending);
        self.appointments = appointments;

        previous
            .filter(|previous| pending > *previous)
            .map(|previous| pending - previous)
    }
}

/// Live admin view over every record plus the transition controls.
pub struct AdminDashboard {
    view: RealTimeView,
    authority: StatusAuthority,
    notifier: Arc<dyn Notifier>,
    board: Arc<RwLock<Board>>,
    subscription: Option<Subscription>,
}

impl AdminDashboard {
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            view: RealTimeView::new(Arc::clone(&store)),
            authority: StatusAuthority::new(store),
            notifier,
            board: Arc::new(RwLock::new(Board::default())),
            subscription: None,
        }
    }

    /// Subscribes to every record. Starting twice keeps the first
    /// subscription.
    pub async fn start(&mut self) -> BookingResult<()> {
        if self.subscription.is_some() {
            return Ok(());
        }

        if self.notifier.permission() == Permission::Default {
            let permission = self.notifier.request_permission();
            info!("Notification permission: {:?}", permission);
        }

        let board = Arc::clone(&self.board);
        let notifier = Arc::clone(&self.notifier);
        let subscription = self
            .view
            .subscribe_all(move |appointments| {
                let added = board
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .refresh(appointments);
                if let Some(added) = added {
                    announce_new_requests(notifier.as_ref(), added);
                }
            })
            .await?;

        self.subscription = Some(subscription);
        info!("Admin dashboard started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("Admin dashboard stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    /// Records of the latest snapshot matching `filter`, ordered by date and
    /// time.
    pub fn appointments(&self, filter: StatusFilter) -> Vec<Appointment> {
        self.board()
            .appointments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::of(&self.board().appointments)
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

    /// Failures are logged and returned; the subscription keeps running.
    pub async fn apply(
        &self,
        id: AppointmentId,
        transition: Transition,
        confirmation: Confirmation,
    ) -> BookingResult<TransitionOutcome> {
        let result = self.authority.apply(id, transition, confirmation).await;
        if let Err(e) = &result {
            error!("Failed to {} appointment {}: {}", transition, id, e);
        }
        result
    }

    fn board(&self) -> RwLockReadGuard<'_, Board> {
        self.board.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AdminDashboard {
    fn drop(&mut self) {
        self.stop();
    }
}
