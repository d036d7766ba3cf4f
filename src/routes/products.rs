use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::{ProductListQuery, SearchQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_products))
        .route("/", axum::routing::post(create_product))
        .route("/featured", axum::routing::get(featured_products))
        .route("/category/{category}", axum::routing::get(products_by_category))
        .route("/search", axum::routing::get(search_products))
        .route("/{id}", axum::routing::get(get_product))
        .route("/{id}", axum::routing::put(update_product))
        .route("/{id}", axum::routing::delete(delete_product))
        .route(
            "/{id}/reviews",
            axum::routing::get(super::reviews::list_reviews).post(super::reviews::add_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("category" = Option<String>, Query, description = "Category slug; empty or 'all' selects everything"),
        ("featured" = Option<bool>, Query, description = "Filter by featured flag"),
        ("search" = Option<String>, Query, description = "Match against name or description"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    product_service::list_products(&state, query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn featured_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    product_service::featured_products(&state).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category}",
    params(
        ("category" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Products in category", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    product_service::products_by_category(&state, &category)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(
        ("q" = String, Query, description = "Search terms")
    ),
    responses(
        (status = 200, description = "Search results", body = ApiResponse<ProductList>),
        (status = 400, description = "Missing query"),
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let q = match query.q.as_ref().filter(|q| !q.trim().is_empty()) {
        Some(q) => q,
        None => return Err(AppError::BadRequest("Search query is required".to_string())),
    };
    product_service::search_products(&state, q).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    product_service::get_product(&state, id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    product_service::create_product(&state, &user, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Update product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    product_service::update_product(&state, &user, id, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Delete product"),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    product_service::delete_product(&state, &user, id)
        .await
        .map(Json)
}
