use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderList, OrderStats, OrderWithItems, UpdateOrderStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_order))
        .route("/", axum::routing::get(list_orders))
        .route("/stats/summary", axum::routing::get(order_stats))
        .route("/{id}", axum::routing::get(get_order))
        .route("/{id}/status", axum::routing::patch(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Create order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    order_service::create_order(&state, payload).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("email" = String, Query, description = "Customer email")
    ),
    responses(
        (status = 200, description = "Orders for a customer", body = ApiResponse<OrderList>),
        (status = 400, description = "Missing email"),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let email = match query.email.as_ref().filter(|e| !e.trim().is_empty()) {
        Some(email) => email,
        None => return Err(AppError::BadRequest("Email is required".to_string())),
    };
    order_service::list_orders_by_email(&state, email)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    order_service::get_order(&state, id).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Update order status", body = ApiResponse<Order>),
        (status = 404, description = "Order not found"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    order_service::update_order_status(&state, &user, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/orders/stats/summary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order statistics", body = ApiResponse<OrderStats>),
        (status = 403, description = "Admin only"),
    ),
    tag = "Orders"
)]
pub async fn order_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderStats>>> {
    order_service::order_stats(&state, &user).await.map(Json)
}
