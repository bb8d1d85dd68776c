//! Operator notifications for new appointment requests.
//!
//! Delivery is best effort. A missing or denied notifier never affects the
//! dashboard or any booking.

use eyre::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
    Unavailable,
}

pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Asks for permission if it has not been decided yet.
    fn request_permission(&self) -> Permission {
        self.permission()
    }

    fn notify(&self, message: &str) -> Result<()>;
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn notify(&self, message: &str) -> Result<()> {
        info!("{}", message);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn permission(&self) -> Permission {
        Permission::Unavailable
    }

    fn notify(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

pub fn new_requests_message(count: usize) -> String {
    if count == 1 {
        "1 new appointment request!".to_string()
    } else {
        format!("{} new appointment requests!", count)
    }
}

/// Sends the new-request notification if permission was granted.
pub(crate) fn announce_new_requests(notifier: &dyn Notifier, count: usize) {
    if notifier.permission() != Permission::Granted {
        debug!("Skipping notification for {} new requests", count);
        return;
    }
    if let Err(e) = notifier.notify(&new_requests_message(count)) {
        debug!("Notification failed: {}", e);
    }
}
