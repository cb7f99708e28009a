use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::orders::{OrderList, OrderSummary, OrderView, RefreshResult, StageCount, TransitionRequest},
    lifecycle::{Stage, StageIcon, TransitionAction},
    models::{DeliveryStatus, MedicineItem, Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::{health, orders, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        orders::list_orders,
        orders::order_summary,
        orders::refresh_orders,
        orders::get_order,
        orders::apply_transition
    ),
    components(
        schemas(
            Order,
            OrderStatus,
            DeliveryStatus,
            MedicineItem,
            Stage,
            StageIcon,
            TransitionAction,
            OrderView,
            OrderList,
            OrderSummary,
            StageCount,
            RefreshResult,
            TransitionRequest,
            health::HealthData,
            params::SortOrder,
            Meta,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<OrderSummary>,
            ApiResponse<RefreshResult>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Orders", description = "Pharmacy order fulfillment endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
