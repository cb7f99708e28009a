use chrono::Utc;

use crate::{
    client::{ApiError, OrderApi},
    lifecycle::{
        actions::TransitionAction,
        error::LifecycleError,
        transition::{RemoteCall, plan_transition},
    },
    models::Order,
    store::OrderStore,
};

/// Run one operator transition end to end.
///
/// The patch is applied locally before the order API is called and rolled back
/// to the pre-transition snapshot if that call fails. Exactly one remote call is
/// made per successful plan; refused requests make none.
pub async fn execute(
    store: &OrderStore,
    api: &dyn OrderApi,
    order_id: &str,
    action: TransitionAction,
    confirmed: bool,
) -> Result<Order, LifecycleError> {
    let now = Utc::now();
    let begun = store
        .begin_transition(order_id, |order| {
            plan_transition(order, action, confirmed, now)
        })
        .await
        .inspect_err(|err| {
            tracing::info!(order_id, action = %action, error = %err, "transition refused");
        })?;

    match dispatch(api, &begun.remote).await {
        Ok(()) => {
            store.complete_transition(order_id).await;
            tracing::info!(
                order_id,
                action = %action,
                status = begun.updated.status.as_str(),
                "transition applied"
            );
            Ok(begun.updated)
        }
        Err(source) => {
            store.rollback_transition(begun.snapshot).await;
            tracing::warn!(order_id, action = %action, error = %source, "remote update failed, rolled back");
            Err(LifecycleError::RemoteUpdateFailed {
                order_id: order_id.to_string(),
                action,
                source,
            })
        }
    }
}

async fn dispatch(api: &dyn OrderApi, call: &RemoteCall) -> Result<(), ApiError> {
    match call {
        RemoteCall::AcceptOrder { order_id } => api.accept_order(order_id).await,
        RemoteCall::UpdateStatus { order_id, status } => {
            api.update_order_status(order_id, *status).await
        }
    }
}
