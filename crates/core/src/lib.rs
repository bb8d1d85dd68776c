//! # SlotBook Core
//!
//! Domain types shared by every SlotBook crate: the appointment record, the
//! hourly slot catalogue, the admin status transitions, the clock
//! abstraction, and the error taxonomy.
//!
//! Nothing in this crate performs I/O.

pub mod catalogue;
pub mod clock;
pub mod errors;
pub mod models;
pub mod transitions;
