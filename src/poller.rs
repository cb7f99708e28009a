use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{services::order_service, state::AppState};

/// Spawn a background task that re-fetches the order list every `interval`.
///
/// A failed refresh is logged and retried on the next tick; orders with a
/// transition in flight keep their local record (see `OrderStore::replace_all`).
pub fn spawn_refresh_tick(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = order_service::refresh_orders(&state).await {
                tracing::warn!(error = %err, "order refresh failed");
            }
        }
    })
}
