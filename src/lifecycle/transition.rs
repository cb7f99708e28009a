use chrono::{DateTime, Utc};

use crate::{
    lifecycle::{
        actions::{TransitionAction, is_legal},
        error::LifecycleError,
        stage::classify,
    },
    models::{DeliveryStatus, Order, OrderStatus},
};

/// Field changes a transition applies to the local record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub pharmacy_accepted: Option<bool>,
    pub pharmacy_rejected: Option<bool>,
    pub pharmacy_confirmed: Option<bool>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(delivery) = self.delivery_status {
            order.delivery_status = Some(delivery);
        }
        if let Some(flag) = self.pharmacy_accepted {
            order.pharmacy_accepted = flag;
        }
        if let Some(flag) = self.pharmacy_rejected {
            order.pharmacy_rejected = flag;
        }
        if let Some(flag) = self.pharmacy_confirmed {
            order.pharmacy_confirmed = flag;
        }
        // stage timestamps are write-once
        set_once(&mut order.accepted_at, self.accepted_at);
        set_once(&mut order.rejected_at, self.rejected_at);
        set_once(&mut order.preparing_at, self.preparing_at);
        set_once(&mut order.out_for_delivery_at, self.out_for_delivery_at);
        set_once(&mut order.delivered_at, self.delivered_at);
    }
}

fn set_once(slot: &mut Option<DateTime<Utc>>, value: Option<DateTime<Utc>>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// The single collaborator call that mirrors a transition remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    AcceptOrder { order_id: String },
    UpdateStatus { order_id: String, status: OrderStatus },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub action: TransitionAction,
    pub patch: OrderPatch,
    pub remote: RemoteCall,
}

/// Plan `action` against an order snapshot without touching it.
///
/// Fails with [`LifecycleError::IllegalTransition`] when the authorizer does not
/// offer the action, and with [`LifecycleError::ConfirmationRequired`] for an
/// irreversible action the operator has not confirmed.
pub fn plan_transition(
    order: &Order,
    action: TransitionAction,
    confirmed: bool,
    now: DateTime<Utc>,
) -> Result<TransitionPlan, LifecycleError> {
    if !is_legal(order, action) {
        return Err(LifecycleError::IllegalTransition {
            order_id: order.id.clone(),
            action,
            stage: classify(order),
        });
    }
    if action.requires_confirmation() && !confirmed {
        return Err(LifecycleError::ConfirmationRequired { action });
    }

    let order_id = order.id.clone();
    let (patch, remote) = match action {
        TransitionAction::Accept => (
            OrderPatch {
                status: Some(OrderStatus::Accepted),
                pharmacy_accepted: Some(true),
                accepted_at: Some(now),
                ..Default::default()
            },
            RemoteCall::AcceptOrder { order_id },
        ),
        TransitionAction::Reject => (
            OrderPatch {
                status: Some(OrderStatus::Rejected),
                pharmacy_rejected: Some(true),
                rejected_at: Some(now),
                ..Default::default()
            },
            RemoteCall::UpdateStatus {
                order_id,
                status: OrderStatus::Rejected,
            },
        ),
        TransitionAction::Confirm => (
            OrderPatch {
                status: Some(OrderStatus::Preparing),
                delivery_status: Some(DeliveryStatus::Preparing),
                pharmacy_confirmed: Some(true),
                preparing_at: Some(now),
                ..Default::default()
            },
            RemoteCall::UpdateStatus {
                order_id,
                status: OrderStatus::Preparing,
            },
        ),
        TransitionAction::OutForDelivery => (
            OrderPatch {
                status: Some(OrderStatus::OutForDelivery),
                delivery_status: Some(DeliveryStatus::OutForDelivery),
                out_for_delivery_at: Some(now),
                ..Default::default()
            },
            RemoteCall::UpdateStatus {
                order_id,
                status: OrderStatus::OutForDelivery,
            },
        ),
        TransitionAction::MarkDelivered => delivered(order_id, OrderStatus::Delivered, now),
        TransitionAction::LegacyComplete => delivered(order_id, OrderStatus::Completed, now),
    };

    Ok(TransitionPlan {
        action,
        patch,
        remote,
    })
}

fn delivered(order_id: String, status: OrderStatus, now: DateTime<Utc>) -> (OrderPatch, RemoteCall) {
    (
        OrderPatch {
            status: Some(status),
            delivery_status: Some(DeliveryStatus::Delivered),
            delivered_at: Some(now),
            ..Default::default()
        },
        RemoteCall::UpdateStatus { order_id, status },
    )
}
