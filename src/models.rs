use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coarse order status as stored by the marketplace order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PaymentPending,
    Confirmed,
    Accepted,
    Rejected,
    Preparing,
    OutForDelivery,
    Delivered,
    Completed,
}

impl OrderStatus {
    /// Wire value sent to the status-update endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Completed | OrderStatus::Delivered
        )
    }
}

/// Delivery sub-phase overlay. Only values that follow pharmacy acceptance exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Preparing,
    OutForDelivery,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// A patient medicine request fulfilled by a single pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    #[serde(default)]
    pub payment_confirmed: bool,
    #[serde(default)]
    pub pharmacy_accepted: bool,
    #[serde(default)]
    pub pharmacy_rejected: bool,
    #[serde(default)]
    pub pharmacy_confirmed: bool,
    #[serde(default)]
    pub medicines: Vec<MedicineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pharmacy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparing_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Minimal record in the given status, as created by the ordering flow.
    pub fn new(id: impl Into<String>, status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status,
            delivery_status: None,
            payment_confirmed: false,
            pharmacy_accepted: false,
            pharmacy_rejected: false,
            pharmacy_confirmed: false,
            medicines: Vec::new(),
            pharmacy_id: None,
            patient_name: None,
            delivery_address: None,
            total_amount: None,
            notes: None,
            created_at,
            accepted_at: None,
            rejected_at: None,
            preparing_at: None,
            out_for_delivery_at: None,
            delivered_at: None,
        }
    }

    /// Accept and reject decisions are mutually exclusive.
    pub fn has_conflicting_decision(&self) -> bool {
        self.pharmacy_accepted && self.pharmacy_rejected
    }
}
