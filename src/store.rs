use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    lifecycle::{
        error::LifecycleError,
        transition::{RemoteCall, TransitionPlan},
    },
    models::Order,
};

/// Working set of orders for one pharmacy, keyed by order id, plus the ids
/// whose transition is awaiting the order API.
///
/// The lock is only held for in-memory work, never across a network call.
#[derive(Debug, Default)]
pub struct OrderStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    orders: HashMap<String, Order>,
    in_flight: HashSet<String>,
    last_refreshed_at: Option<DateTime<Utc>>,
    // bumped by every completed transition
    epoch: u64,
    // order id -> epoch its last transition completed at
    resolved: HashMap<String, u64>,
    // newest ticket whose list has been applied
    applied: u64,
}

/// Store generation observed before a list fetch starts.
///
/// Passed back to [`OrderStore::replace_all`] so a list fetched before a
/// transition completed cannot overwrite that transition's local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Result of starting a transition: the optimistic record, the snapshot to
/// roll back to, and the call that must now be made.
#[derive(Debug, Clone)]
pub struct BegunTransition {
    pub snapshot: Order,
    pub updated: Order,
    pub remote: RemoteCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub received: usize,
    pub kept_in_flight: usize,
    pub kept_recent: usize,
    /// A newer list was already applied; nothing changed.
    pub stale: bool,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect();
        Self {
            inner: RwLock::new(StoreInner {
                orders,
                ..Default::default()
            }),
        }
    }

    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.inner.read().await.orders.get(order_id).cloned()
    }

    pub async fn list(&self) -> Vec<Order> {
        self.inner.read().await.orders.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    pub async fn is_in_flight(&self, order_id: &str) -> bool {
        self.inner.read().await.in_flight.contains(order_id)
    }

    pub async fn in_flight_ids(&self) -> HashSet<String> {
        self.inner.read().await.in_flight.clone()
    }

    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_refreshed_at
    }

    pub async fn refresh_ticket(&self) -> RefreshTicket {
        RefreshTicket(self.inner.read().await.epoch)
    }

    /// Replace the working set with a list fetched after `ticket` was taken.
    ///
    /// Orders with a transition in flight keep their optimistic local record,
    /// as do orders whose transition completed after the ticket: the list
    /// predates them. A list older than one already applied is dropped.
    pub async fn replace_all(
        &self,
        fetched: Vec<Order>,
        ticket: RefreshTicket,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        let mut inner = self.inner.write().await;
        let received = fetched.len();

        if ticket.0 < inner.applied {
            return RefreshOutcome {
                received,
                kept_in_flight: 0,
                kept_recent: 0,
                stale: true,
            };
        }

        let mut next: HashMap<String, Order> = fetched
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect();

        let mut kept_in_flight = 0;
        for id in inner.in_flight.iter() {
            if let Some(local) = inner.orders.get(id) {
                next.insert(id.clone(), local.clone());
                kept_in_flight += 1;
            }
        }

        let mut kept_recent = 0;
        for (id, _) in inner.resolved.iter().filter(|(_, epoch)| **epoch > ticket.0) {
            if inner.in_flight.contains(id) {
                continue;
            }
            if let Some(local) = inner.orders.get(id) {
                next.insert(id.clone(), local.clone());
                kept_recent += 1;
            }
        }

        inner.resolved.retain(|_, epoch| *epoch > ticket.0);
        inner.orders = next;
        inner.applied = ticket.0;
        inner.last_refreshed_at = Some(now);
        RefreshOutcome {
            received,
            kept_in_flight,
            kept_recent,
            stale: false,
        }
    }

    /// Plan and optimistically apply a transition in one critical section.
    ///
    /// Fails with `TransitionInProgress` when `order_id` is already in flight;
    /// on any planning error the store is left untouched.
    pub async fn begin_transition<F>(
        &self,
        order_id: &str,
        plan: F,
    ) -> Result<BegunTransition, LifecycleError>
    where
        F: FnOnce(&Order) -> Result<TransitionPlan, LifecycleError>,
    {
        let mut inner = self.inner.write().await;
        if inner.in_flight.contains(order_id) {
            return Err(LifecycleError::TransitionInProgress(order_id.to_string()));
        }

        let order = inner
            .orders
            .get_mut(order_id)
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        let planned = plan(order)?;
        let snapshot = order.clone();
        planned.patch.apply_to(order);
        let updated = order.clone();

        inner.in_flight.insert(order_id.to_string());
        Ok(BegunTransition {
            snapshot,
            updated,
            remote: planned.remote,
        })
    }

    /// The remote call succeeded; the optimistic record stands.
    pub async fn complete_transition(&self, order_id: &str) {
        let mut inner = self.inner.write().await;
        inner.in_flight.remove(order_id);
        inner.epoch += 1;
        let epoch = inner.epoch;
        inner.resolved.insert(order_id.to_string(), epoch);
    }

    /// The remote call failed; put the pre-transition snapshot back.
    pub async fn rollback_transition(&self, snapshot: Order) {
        let mut inner = self.inner.write().await;
        inner.in_flight.remove(&snapshot.id);
        inner.orders.insert(snapshot.id.clone(), snapshot);
    }
}
