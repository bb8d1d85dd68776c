//! Hourly slot catalogue.
//!
//! Slots are a pure function of the weekday and are never persisted:
//! Monday to Friday 08:00–19:00, Saturday 09:00–14:00, Sunday closed.
//! Both bounds are inclusive.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::slot::SlotTime;

pub const WEEKDAY_HOURS: RangeInclusive<u8> = 8..=19;
pub const SATURDAY_HOURS: RangeInclusive<u8> = 9..=14;

pub fn opening_hours(weekday: Weekday) -> Option<RangeInclusive<u8>> {
    match weekday {
        Weekday::Sun => None,
        Weekday::Sat => Some(SATURDAY_HOURS),
        _ => Some(WEEKDAY_HOURS),
    }
}

pub fn is_open(date: NaiveDate) -> bool {
    opening_hours(date.weekday()).is_some()
}

/// All slot times offered on `date`, ascending.
pub fn slots_for(date: NaiveDate) -> Vec<SlotTime> {
    opening_hours(date.weekday())
        .into_iter()
        .flatten()
        .filter_map(|hour| SlotTime::from_hour(hour).ok())
        .collect()
}

pub fn offers(date: NaiveDate, time: SlotTime) -> bool {
    opening_hours(date.weekday()).is_some_and(|hours| hours.contains(&time.hour()))
}
