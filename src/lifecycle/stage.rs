use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DeliveryStatus, Order, OrderStatus};

/// Display stage shown to the pharmacy operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Payment,
    Confirmed,
    Accepted,
    Rejected,
    Preparing,
    OutForDelivery,
    Delivered,
}

/// Icon family the UI renders next to a stage badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StageIcon {
    Clock,
    CreditCard,
    CheckCircle,
    XCircle,
    Package,
    Truck,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Pending,
        Stage::Payment,
        Stage::Confirmed,
        Stage::Accepted,
        Stage::Rejected,
        Stage::Preparing,
        Stage::OutForDelivery,
        Stage::Delivered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pending => "Pending",
            Stage::Payment => "Awaiting Payment",
            Stage::Confirmed => "Confirmed",
            Stage::Accepted => "Accepted",
            Stage::Rejected => "Rejected",
            Stage::Preparing => "Preparing",
            Stage::OutForDelivery => "Out for Delivery",
            Stage::Delivered => "Delivered",
        }
    }

    pub fn icon(&self) -> StageIcon {
        match self {
            Stage::Pending => StageIcon::Clock,
            Stage::Payment => StageIcon::CreditCard,
            Stage::Confirmed | Stage::Accepted | Stage::Delivered => StageIcon::CheckCircle,
            Stage::Rejected => StageIcon::XCircle,
            Stage::Preparing => StageIcon::Package,
            Stage::OutForDelivery => StageIcon::Truck,
        }
    }
}

/// Resolve the display stage of an order. The most progressed signal wins, so
/// `delivery_status` overrides a stale coarse `status`.
pub fn classify(order: &Order) -> Stage {
    let delivery = order.delivery_status;
    let status = order.status;

    if delivery == Some(DeliveryStatus::Delivered)
        || matches!(status, OrderStatus::Completed | OrderStatus::Delivered)
    {
        return Stage::Delivered;
    }
    if delivery == Some(DeliveryStatus::OutForDelivery) || status == OrderStatus::OutForDelivery {
        return Stage::OutForDelivery;
    }
    if delivery == Some(DeliveryStatus::Preparing) || status == OrderStatus::Preparing {
        return Stage::Preparing;
    }

    match status {
        OrderStatus::PaymentPending => Stage::Payment,
        OrderStatus::Confirmed => Stage::Confirmed,
        OrderStatus::Accepted => Stage::Accepted,
        OrderStatus::Rejected => Stage::Rejected,
        _ => Stage::Pending,
    }
}
