//! PostgreSQL-backed appointment store.
//!
//! The conditional create runs in one transaction: `INSERT ... ON CONFLICT DO
//! NOTHING` settles the common case, and when the key is taken the existing
//! row is read `FOR UPDATE`, so concurrent rebookings of a rejected slot queue
//! on the row lock and the second one sees the first one's pending record.
//!
//! Every write queues a `pg_notify` in the same transaction; a background
//! `PgListener` forwards those notifications to the in-process change feed,
//! which also makes writes from other processes visible to live queries.

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, eyre};
use slotbook_core::models::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus,
};
use sqlx::postgres::PgListener;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    DbPool,
    models::into_appointments,
    repositories::appointment::{self as repo, CHANGE_CHANNEL},
    store::{AppointmentQuery, AppointmentStore, CHANGE_FEED_CAPACITY, CreateOutcome, StoreChange},
};

/// A row can vanish between the failed insert and the locking read when an
/// admin deletes it concurrently; the create is retried this many times.
const MAX_CREATE_ATTEMPTS: u32 = 3;

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct PgAppointmentStore {
    pool: DbPool,
    changes: broadcast::Sender<StoreChange>,
    listener: JoinHandle<()>,
}

impl PgAppointmentStore {
    /// Starts listening for change notifications and returns the store.
    pub async fn connect(pool: DbPool) -> Result<Self> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!("Listening for appointment changes on '{}'", CHANGE_CHANNEL);

        let listener = tokio::spawn(forward_notifications(listener, changes.clone()));

        Ok(Self {
            pool,
            changes,
            listener,
        })
    }
}

impl Drop for PgAppointmentStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn forward_notifications(mut listener: PgListener, changes: broadcast::Sender<StoreChange>) {
    loop {
        match listener.try_recv().await {
            Ok(Some(notification)) => {
                match serde_json::from_str::<StoreChange>(notification.payload()) {
                    Ok(change) => {
                        let _ = changes.send(change);
                    }
                    Err(e) => warn!(
                        "Ignoring malformed change notification {:?}: {}",
                        notification.payload(),
                        e
                    ),
                }
            }
            Ok(None) => {
                // The listener reconnects on the next call; anything sent in
                // between is lost.
                warn!("Change listener lost its connection, reconnecting");
                let _ = changes.send(StoreChange::Resync);
            }
            Err(e) => {
                error!("Change listener error: {}", e);
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                let _ = changes.send(StoreChange::Resync);
            }
        }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn create_unless_occupied(&self, draft: AppointmentDraft) -> Result<CreateOutcome> {
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            if let Some(row) = repo::insert_if_absent(&mut *tx, &draft).await? {
                repo::notify_change(&mut *tx, &StoreChange::created(draft.id)).await?;
                tx.commit().await?;
                return Ok(CreateOutcome::Created(row.try_into()?));
            }

            let Some(row) = repo::lock_appointment(&mut *tx, draft.id).await? else {
                tx.rollback().await?;
                debug!(
                    "Appointment {} vanished before it could be locked (attempt {})",
                    draft.id, attempt
                );
                continue;
            };

            let existing: Appointment = row.try_into()?;
            if existing.status.occupies_slot() {
                tx.rollback().await?;
                return Ok(CreateOutcome::Occupied(existing));
            }

            repo::archive_appointment(&mut *tx, draft.id).await?;
            let row = repo::replace_appointment(&mut *tx, &draft).await?;
            repo::notify_change(&mut *tx, &StoreChange::created(draft.id)).await?;
            tx.commit().await?;

            debug!("Rebooked rejected appointment {}", draft.id);
            return Ok(CreateOutcome::Created(row.try_into()?));
        }

        Err(eyre!(
            "Could not settle reservation for {} after {} attempts",
            draft.id,
            MAX_CREATE_ATTEMPTS
        ))
    }

    async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        let mut conn = self.pool.acquire().await?;
        repo::get_appointment(&mut conn, id)
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = repo::update_status(&mut *tx, id, from, to).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        repo::notify_change(&mut *tx, &StoreChange::updated(id)).await?;
        tx.commit().await?;

        Ok(Some(row.try_into()?))
    }

    async fn delete_if_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        if !repo::delete_with_status(&mut *tx, id, status).await? {
            tx.rollback().await?;
            return Ok(false);
        }
        repo::notify_change(&mut *tx, &StoreChange::deleted(id)).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn list(&self, query: AppointmentQuery) -> Result<Vec<Appointment>> {
        let mut conn = self.pool.acquire().await?;
        into_appointments(repo::list_appointments(&mut conn, query.date).await?)
    }

    async fn history(&self, id: AppointmentId) -> Result<Vec<Appointment>> {
        let mut conn = self.pool.acquire().await?;
        into_appointments(repo::list_history(&mut conn, id).await?)
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
