use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    lifecycle::stage::{Stage, classify},
    models::{Order, OrderStatus},
};

/// Operator-triggered transitions of the fulfillment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TransitionAction {
    Accept,
    Reject,
    /// Start preparing the order.
    Confirm,
    OutForDelivery,
    MarkDelivered,
    /// Completion path for records created before payment gating existed.
    LegacyComplete,
}

impl TransitionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionAction::Accept => "accept",
            TransitionAction::Reject => "reject",
            TransitionAction::Confirm => "confirm",
            TransitionAction::OutForDelivery => "outForDelivery",
            TransitionAction::MarkDelivered => "markDelivered",
            TransitionAction::LegacyComplete => "legacyComplete",
        }
    }

    /// Irreversible actions the operator must explicitly confirm.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, TransitionAction::Reject)
    }
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every action currently legal for `order`, in canonical order.
///
/// Pure function of the order snapshot. The list view, the detail view and the
/// executor all go through here so the rules live in exactly one place.
pub fn legal_actions(order: &Order) -> Vec<TransitionAction> {
    let stage = classify(order);
    if order.status.is_terminal() || stage == Stage::Delivered {
        return Vec::new();
    }

    if is_legacy_record(order) {
        return vec![TransitionAction::LegacyComplete];
    }

    // Nothing but the accept/reject decision is available before acceptance.
    if decision_open(order) {
        return vec![TransitionAction::Accept, TransitionAction::Reject];
    }

    let mut actions = Vec::new();
    if can_confirm(order, stage) {
        actions.push(TransitionAction::Confirm);
    }
    if stage == Stage::Preparing {
        actions.push(TransitionAction::OutForDelivery);
    }
    if can_mark_delivered(order, stage) {
        actions.push(TransitionAction::MarkDelivered);
    }
    actions
}

pub fn is_legal(order: &Order, action: TransitionAction) -> bool {
    legal_actions(order).contains(&action)
}

/// The single action a compact UI surfaces. Accept stands for the accept/reject pair.
pub fn primary_action(actions: &[TransitionAction]) -> Option<TransitionAction> {
    const PRECEDENCE: [TransitionAction; 5] = [
        TransitionAction::Accept,
        TransitionAction::Confirm,
        TransitionAction::OutForDelivery,
        TransitionAction::MarkDelivered,
        TransitionAction::LegacyComplete,
    ];
    PRECEDENCE.into_iter().find(|action| actions.contains(action))
}

fn is_legacy_record(order: &Order) -> bool {
    order.status == OrderStatus::Pending && !order.payment_confirmed
}

fn decision_open(order: &Order) -> bool {
    let negotiable = order.payment_confirmed
        || matches!(
            order.status,
            OrderStatus::Pending | OrderStatus::PaymentPending | OrderStatus::Confirmed
        );
    let undecided = !order.pharmacy_accepted && !order.pharmacy_rejected;
    let advanced = matches!(
        order.status,
        OrderStatus::Completed
            | OrderStatus::Rejected
            | OrderStatus::Accepted
            | OrderStatus::Preparing
            | OrderStatus::OutForDelivery
    );
    // any delivery_status value implies the order is already past acceptance
    negotiable && undecided && !advanced && order.delivery_status.is_none()
}

fn can_confirm(order: &Order, stage: Stage) -> bool {
    matches!(
        order.status,
        OrderStatus::Accepted | OrderStatus::Confirmed | OrderStatus::PaymentPending
    ) && order.pharmacy_accepted
        && !order.pharmacy_confirmed
        && order.payment_confirmed
        && !matches!(
            stage,
            Stage::Preparing | Stage::OutForDelivery | Stage::Delivered
        )
}

fn can_mark_delivered(order: &Order, stage: Stage) -> bool {
    if stage == Stage::OutForDelivery {
        return true;
    }
    // Fast path: a paid order may be delivered without the intermediate bookkeeping.
    order.payment_confirmed
        && matches!(
            order.status,
            OrderStatus::Confirmed
                | OrderStatus::PaymentPending
                | OrderStatus::Preparing
                | OrderStatus::OutForDelivery
        )
}
