mod common;

use std::sync::Arc;

use axum::extract::State;
use common::{FakeOrderApi, order};
use pharmacy_fulfillment::{
    models::OrderStatus, routes::health::health_check, state::AppState, store::OrderStore,
};

#[tokio::test]
async fn health_check_returns_ok() {
    let store = OrderStore::with_orders([order("o1", OrderStatus::Pending, false)]);
    let state = AppState::with_store(Arc::new(FakeOrderApi::default()), store);

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.orders_loaded, 1);
    assert!(data.last_refreshed_at.is_none());
}
