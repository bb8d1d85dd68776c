#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use slotbook_booking::SlotReservationService;
use slotbook_core::{
    clock::FixedClock,
    models::{appointment::ReservationRequest, slot::SlotTime},
};
use slotbook_db::{AppointmentStore, MemoryAppointmentStore};

/// Monday.
pub const MONDAY: (i32, u32, u32) = (2024, 6, 10);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn monday() -> NaiveDate {
    date(MONDAY.0, MONDAY.1, MONDAY.2)
}

pub fn tuesday() -> NaiveDate {
    date(2024, 6, 11)
}

pub fn slot(time: &str) -> SlotTime {
    time.parse().unwrap()
}

pub fn store() -> Arc<dyn AppointmentStore> {
    Arc::new(MemoryAppointmentStore::with_clock(Arc::new(FixedClock::on(
        monday(),
    ))))
}

/// A service whose "today" is the Monday used throughout the tests.
pub fn service(store: &Arc<dyn AppointmentStore>) -> SlotReservationService {
    SlotReservationService::new(Arc::clone(store), Arc::new(FixedClock::on(monday())))
}

pub fn request(day: NaiveDate, time: &str, name: &str) -> ReservationRequest {
    ReservationRequest {
        date: day.format("%Y-%m-%d").to_string(),
        time: time.to_string(),
        name: name.to_string(),
        phone: "555-0100".to_string(),
        reason: None,
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn eventually(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Gives background tasks time to run; used to check that nothing happens.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
