use std::sync::Arc;

use crate::{client::OrderApi, store::OrderStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<OrderStore>,
    pub api: Arc<dyn OrderApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn OrderApi>) -> Self {
        Self {
            store: Arc::new(OrderStore::new()),
            api,
        }
    }

    pub fn with_store(api: Arc<dyn OrderApi>, store: OrderStore) -> Self {
        Self {
            store: Arc::new(store),
            api,
        }
    }
}
