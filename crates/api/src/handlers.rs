/// Admin list, transitions and history
pub mod admin;
/// Client reservations
pub mod appointments;
/// Slot availability for one date
pub mod availability;

use axum::response::sse::Event;
use futures_util::{Stream, StreamExt, stream};
use serde::Serialize;
use slotbook_booking::Subscription;
use tokio::sync::mpsc;

/// Builds a named server-sent event carrying `data` as JSON.
pub(crate) fn json_event(name: &str, data: &impl Serialize) -> Result<Event, axum::Error> {
    Event::default().event(name).json_data(data)
}

/// Turns the updates a subscription pushes into `rx` into named events.
///
/// The stream owns `subscription`, so dropping it (on client disconnect)
/// unsubscribes.
pub(crate) fn subscription_events<T>(
    name: &'static str,
    rx: mpsc::UnboundedReceiver<T>,
    subscription: Subscription,
) -> impl Stream<Item = Result<Event, axum::Error>>
where
    T: Serialize + Send + 'static,
{
    stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let update = rx.recv().await;
        update.map(|update| (update, (rx, subscription)))
    })
    .map(move |update| json_event(name, &update))
}
