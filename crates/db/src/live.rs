//! Live queries over an [`AppointmentStore`].
//!
//! A live query yields the current result set once, then a fresh result set
//! after every change that may affect it. Bursts of changes are coalesced
//! into a single re-read; a subscriber that lags behind the change feed also
//! re-reads, so no change is ever lost, only folded into a later snapshot.

use std::sync::Arc;

use eyre::Result;
use slotbook_core::models::appointment::Appointment;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::warn;

use crate::store::{AppointmentQuery, AppointmentStore, StoreChange};

pub struct LiveQuery {
    store: Arc<dyn AppointmentStore>,
    query: AppointmentQuery,
    changes: broadcast::Receiver<StoreChange>,
    primed: bool,
}

impl LiveQuery {
    /// Registers on the change feed immediately, so nothing written after
    /// this call can be missed by the first snapshot.
    pub fn new(store: Arc<dyn AppointmentStore>, query: AppointmentQuery) -> Self {
        let changes = store.changes();
        Self {
            store,
            query,
            changes,
            primed: false,
        }
    }

    pub fn query(&self) -> AppointmentQuery {
        self.query
    }

    /// Waits for the next snapshot. The first call returns immediately with
    /// the current state. Returns `None` once the change feed is closed.
    pub async fn next_snapshot(&mut self) -> Option<Result<Vec<Appointment>>> {
        if !self.primed {
            self.primed = true;
            return Some(self.store.list(self.query).await);
        }

        loop {
            match self.changes.recv().await {
                Ok(change) if self.query.is_affected_by(&change) => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Live query lagged by {} changes, re-reading", skipped);
                    break;
                }
                Err(RecvError::Closed) => return None,
            }
        }
        Some(self.current().await)
    }

    /// Re-reads the result set now, folding in any queued changes.
    pub async fn current(&mut self) -> Result<Vec<Appointment>> {
        self.drain_pending();
        self.store.list(self.query).await
    }

    /// Discards queued changes; the snapshot about to be read covers them.
    fn drain_pending(&mut self) {
        loop {
            match self.changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
