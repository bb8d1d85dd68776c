//! Push-style views over the store.
//!
//! Each subscription owns one [`LiveQuery`] driven by a spawned task. The
//! listener sits behind a mutex that the task holds while invoking it, so
//! once [`Subscription::unsubscribe`] has cleared it no callback can start.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::NaiveDate;
use eyre::eyre;
use slotbook_core::{
    errors::{BookingError, BookingResult},
    models::{appointment::Appointment, slot::SlotMap},
};
use slotbook_db::{AppointmentQuery, AppointmentStore, LiveQuery};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const RETRY_INITIAL: Duration = Duration::from_millis(50);
const RETRY_MAX: Duration = Duration::from_secs(5);

type Listener = Box<dyn Fn(Vec<Appointment>) + Send + Sync>;
type ListenerSlot = Arc<Mutex<Option<Listener>>>;

#[derive(Clone)]
pub struct RealTimeView {
    store: Arc<dyn AppointmentStore>,
}

impl RealTimeView {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Calls `on_change` with the occupied slots of `date` before returning,
    /// then again after every change to that date.
    pub async fn subscribe<F>(&self, date: NaiveDate, on_change: F) -> BookingResult<Subscription>
    where
        F: Fn(SlotMap) + Send + Sync + 'static,
    {
        self.watch(AppointmentQuery::for_date(date), move |appointments| {
            on_change(SlotMap::from_appointments(&appointments))
        })
        .await
    }

    /// Calls `on_change` with every record, ordered by date and time.
    pub async fn subscribe_all<F>(&self, on_change: F) -> BookingResult<Subscription>
    where
        F: Fn(Vec<Appointment>) + Send + Sync + 'static,
    {
        self.watch(AppointmentQuery::all(), on_change).await
    }

    async fn watch<F>(&self, query: AppointmentQuery, on_change: F) -> BookingResult<Subscription>
    where
        F: Fn(Vec<Appointment>) + Send + Sync + 'static,
    {
        let mut live = LiveQuery::new(Arc::clone(&self.store), query);
        let initial = match live.next_snapshot().await {
            Some(snapshot) => snapshot?,
            None => return Err(BookingError::Store(eyre!("Change feed is closed"))),
        };

        let on_change: Listener = Box::new(on_change);
        let listener: ListenerSlot = Arc::new(Mutex::new(Some(on_change)));
        deliver(&listener, initial);

        let task_listener = Arc::clone(&listener);
        let task = tokio::spawn(async move {
            while let Some(mut snapshot) = live.next_snapshot().await {
                let mut backoff = RETRY_INITIAL;
                let appointments = loop {
                    match snapshot {
                        Ok(appointments) => break appointments,
                        Err(e) => {
                            warn!(
                                "Live query {:?} failed to re-read, retrying in {:?}: {}",
                                live.query(),
                                backoff,
                                e
                            );
                            tokio::time::sleep(backoff).await;
                            backoff = (backoff * 2).min(RETRY_MAX);
                            snapshot = live.current().await;
                        }
                    }
                };
                if !deliver(&task_listener, appointments) {
                    break;
                }
            }
            debug!("Live query {:?} stopped", live.query());
        });

        Ok(Subscription {
            listener,
            task: Some(task),
        })
    }
}

/// Returns `false` once the listener has been cleared.
fn deliver(listener: &Mutex<Option<Listener>>, appointments: Vec<Appointment>) -> bool {
    let guard = listener.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref() {
        Some(on_change) => {
            on_change(appointments);
            true
        }
        None => false,
    }
}

/// Handle to a live subscription. Dropping it unsubscribes.
///
/// `unsubscribe` must not be called from inside the subscription's own
/// listener.
pub struct Subscription {
    listener: ListenerSlot,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops all further callbacks and releases the watch task. Calling it
    /// again does nothing.
    pub fn unsubscribe(&mut self) {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
