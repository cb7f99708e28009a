use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::orders::{OrderList, OrderSummary, OrderView, RefreshResult, TransitionRequest},
    error::AppResult,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/summary", get(order_summary))
        .route("/refresh", post(refresh_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/transitions", post(apply_transition))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders with their stage and legal actions", body = ApiResponse<OrderList>),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/summary",
    responses(
        (status = 200, description = "Order counts per stage", body = ApiResponse<OrderSummary>),
    ),
    tag = "Orders"
)]
pub async fn order_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    let resp = order_service::order_summary(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/refresh",
    responses(
        (status = 200, description = "Orders re-fetched from the order API", body = ApiResponse<RefreshResult>),
        (status = 502, description = "Order API unavailable"),
    ),
    tag = "Orders"
)]
pub async fn refresh_orders(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<RefreshResult>>> {
    let result = order_service::refresh_orders(&state).await?;
    Ok(Json(ApiResponse::success(
        "Orders refreshed",
        result,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its stage and legal actions", body = ApiResponse<OrderView>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_order(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/transitions",
    params(("id" = String, Path, description = "Order ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = ApiResponse<OrderView>),
        (status = 400, description = "Confirmation required"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "A transition for this order is in progress"),
        (status = 422, description = "Action not allowed in the current stage"),
        (status = 502, description = "Order API rejected the update, local state rolled back"),
    ),
    tag = "Orders"
)]
pub async fn apply_transition(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::apply_transition(&state, &id, payload).await?;
    Ok(Json(resp))
}
