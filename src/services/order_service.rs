use std::collections::HashMap;

use chrono::Utc;

use crate::{
    dto::orders::{
        OrderList, OrderSummary, OrderView, RefreshResult, StageCount, TransitionRequest,
    },
    error::{AppError, AppResult},
    lifecycle::{self, Stage, legal_actions},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let in_flight = state.store.in_flight_ids().await;

    let mut views: Vec<OrderView> = state
        .store
        .list()
        .await
        .into_iter()
        .map(|order| {
            let busy = in_flight.contains(&order.id);
            OrderView::new(order, busy)
        })
        .filter(|view| query.stage.is_none_or(|stage| view.stage == stage))
        .collect();

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    views.sort_by(|a, b| {
        sort_order.apply(
            a.order
                .created_at
                .cmp(&b.order.created_at)
                .then_with(|| a.order.id.cmp(&b.order.id)),
        )
    });

    let total = views.len() as i64;
    let items = views
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<OrderView>> {
    let order = match state.store.get(id).await {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    let in_flight = state.store.is_in_flight(id).await;

    Ok(ApiResponse::success(
        "OK",
        OrderView::new(order, in_flight),
        Some(Meta::empty()),
    ))
}

pub async fn apply_transition(
    state: &AppState,
    id: &str,
    payload: TransitionRequest,
) -> AppResult<ApiResponse<OrderView>> {
    let order = lifecycle::execute(
        &state.store,
        state.api.as_ref(),
        id,
        payload.action,
        payload.confirm,
    )
    .await?;

    Ok(ApiResponse::success(
        "Transition applied",
        OrderView::new(order, false),
        Some(Meta::empty()),
    ))
}

/// Re-fetch the working set from the order API.
pub async fn refresh_orders(state: &AppState) -> AppResult<RefreshResult> {
    let ticket = state.store.refresh_ticket().await;
    let fetched = state.api.list_orders().await?;
    for order in fetched.iter().filter(|o| o.has_conflicting_decision()) {
        tracing::warn!(order_id = %order.id, "order is marked both accepted and rejected");
    }

    let refreshed_at = Utc::now();
    let outcome = state.store.replace_all(fetched, ticket, refreshed_at).await;
    if outcome.stale {
        tracing::info!(received = outcome.received, "dropped list older than the applied one");
    } else {
        tracing::debug!(
            received = outcome.received,
            kept_in_flight = outcome.kept_in_flight,
            kept_recent = outcome.kept_recent,
            "orders refreshed"
        );
    }

    Ok(RefreshResult {
        received: outcome.received,
        kept_in_flight: outcome.kept_in_flight,
        kept_recent: outcome.kept_recent,
        stale: outcome.stale,
        refreshed_at,
    })
}

pub async fn order_summary(state: &AppState) -> AppResult<ApiResponse<OrderSummary>> {
    let orders = state.store.list().await;
    let in_flight = state.store.in_flight_ids().await;

    let mut counts: HashMap<Stage, usize> = HashMap::new();
    let mut actionable = 0;
    for order in &orders {
        *counts.entry(lifecycle::classify(order)).or_default() += 1;
        if !in_flight.contains(&order.id) && !legal_actions(order).is_empty() {
            actionable += 1;
        }
    }

    let stages = Stage::ALL
        .into_iter()
        .map(|stage| StageCount {
            stage,
            label: stage.label().to_string(),
            count: counts.get(&stage).copied().unwrap_or(0),
        })
        .collect();

    let summary = OrderSummary {
        total: orders.len(),
        actionable,
        in_flight: in_flight.len(),
        stages,
        last_refreshed_at: state.store.last_refreshed_at().await,
    };
    Ok(ApiResponse::success("Order summary", summary, Some(Meta::empty())))
}
