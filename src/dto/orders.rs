use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    lifecycle::{Stage, StageIcon, TransitionAction, classify, legal_actions, primary_action},
    models::Order,
};

/// An order as the pharmacy console renders it: the record plus its stage and
/// the transitions the operator may trigger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub stage: Stage,
    pub stage_label: String,
    pub stage_icon: StageIcon,
    pub actions: Vec<TransitionAction>,
    pub primary_action: Option<TransitionAction>,
    pub in_flight: bool,
}

impl OrderView {
    pub fn new(order: Order, in_flight: bool) -> Self {
        let stage = classify(&order);
        // controls stay disabled until the outstanding call resolves
        let actions = if in_flight {
            Vec::new()
        } else {
            legal_actions(&order)
        };
        let primary_action = primary_action(&actions);
        Self {
            order,
            stage,
            stage_label: stage.label().to_string(),
            stage_icon: stage.icon(),
            actions,
            primary_action,
            in_flight,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub action: TransitionAction,
    /// Explicit operator confirmation, required for `reject`.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StageCount {
    pub stage: Stage,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total: usize,
    pub actionable: usize,
    pub in_flight: usize,
    pub stages: Vec<StageCount>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    pub received: usize,
    pub kept_in_flight: usize,
    /// Orders whose transition completed while the list was being fetched.
    pub kept_recent: usize,
    pub stale: bool,
    pub refreshed_at: DateTime<Utc>,
}
