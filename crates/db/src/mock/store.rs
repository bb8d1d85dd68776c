use async_trait::async_trait;
use mockall::mock;
use slotbook_core::models::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus,
};
use tokio::sync::broadcast;

use crate::store::{AppointmentQuery, AppointmentStore, CreateOutcome, StoreChange};

// Mock store for failure injection in tests
mock! {
    pub AppointmentStore {}

    #[async_trait]
    impl AppointmentStore for AppointmentStore {
        async fn create_unless_occupied(
            &self,
            draft: AppointmentDraft,
        ) -> eyre::Result<CreateOutcome>;

        async fn get(&self, id: AppointmentId) -> eyre::Result<Option<Appointment>>;

        async fn update_status(
            &self,
            id: AppointmentId,
            from: AppointmentStatus,
            to: AppointmentStatus,
        ) -> eyre::Result<Option<Appointment>>;

        async fn delete_if_status(
            &self,
            id: AppointmentId,
            status: AppointmentStatus,
        ) -> eyre::Result<bool>;

        async fn list(&self, query: AppointmentQuery) -> eyre::Result<Vec<Appointment>>;

        async fn history(&self, id: AppointmentId) -> eyre::Result<Vec<Appointment>>;

        fn changes(&self) -> broadcast::Receiver<StoreChange>;
    }
}
