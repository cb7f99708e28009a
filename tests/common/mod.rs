#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pharmacy_fulfillment::{
    client::{ApiError, OrderApi},
    models::{Order, OrderStatus},
};
use tokio::sync::Semaphore;

/// In-memory order API that records every call it receives.
#[derive(Default)]
pub struct FakeOrderApi {
    orders: Mutex<Vec<Order>>,
    calls: Mutex<Vec<String>>,
    fail_updates: AtomicBool,
    fail_list: AtomicBool,
    hold: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeOrderApi {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let api = Self::default();
        *api.orders.lock().unwrap() = orders;
        api
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.lock().unwrap() = orders;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Park every mutating call until a permit is added to the returned semaphore.
    pub fn hold_updates(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.hold.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn mutate(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let hold = self.hold.lock().unwrap().clone();
        if let Some(gate) = hold {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "order service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OrderApi for FakeOrderApi {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.calls.lock().unwrap().push("list".into());
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn accept_order(&self, order_id: &str) -> Result<(), ApiError> {
        self.mutate(format!("accept:{order_id}")).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.mutate(format!("status:{order_id}:{}", status.as_str()))
            .await
    }
}

pub fn created_at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
}

pub fn order(id: &str, status: OrderStatus, paid: bool) -> Order {
    let mut order = Order::new(id, status, created_at(1));
    order.payment_confirmed = paid;
    order
}
