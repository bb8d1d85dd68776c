//! # SlotBook Booking
//!
//! The booking protocol on top of an [`AppointmentStore`]:
//!
//! - [`SlotReservationService`] derives availability and reserves slots
//!   through the store's conditional create.
//! - [`StatusAuthority`] applies the admin transitions.
//! - [`RealTimeView`] pushes live slot occupancy to observers.
//! - [`BookingSession`] and [`AdminDashboard`] hold the per-user state of the
//!   booking flow and the admin view, each owning its one subscription.
//!
//! No in-process lock guards a slot; the store decides every race.
//!
//! [`AppointmentStore`]: slotbook_db::AppointmentStore

pub mod authority;
pub mod dashboard;
pub mod notify;
pub mod reservation;
pub mod session;
pub mod view;

pub use authority::{StatusAuthority, TransitionOutcome};
pub use dashboard::{AdminDashboard, StatusCounts, StatusFilter};
pub use notify::{LogNotifier, NoNotifier, Notifier, Permission};
pub use reservation::SlotReservationService;
pub use session::BookingSession;
pub use view::{RealTimeView, Subscription};
