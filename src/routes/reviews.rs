use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

// The per-product list/add routes live on the products router; this one
// carries the by-id operations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", axum::routing::put(update_review))
        .route("/{id}", axum::routing::delete(delete_review))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "List reviews for a product", body = ApiResponse<ReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    review_service::list_reviews(&state.pool, id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Add review", body = ApiResponse<Review>),
        (status = 400, description = "Validation failed or already reviewed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    review_service::add_review(&state.pool, &user, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Update review", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
    ),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    review_service::update_review(&state.pool, &user, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Delete review"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    review_service::delete_review(&state.pool, &user, id)
        .await
        .map(Json)
}
