use axum::{
    Json, Router,
    extract::State,
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", axum::routing::post(register))
        .route("/login", axum::routing::post(login))
        .route("/logout", axum::routing::post(logout))
        .route("/me", axum::routing::get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register a new account", body = ApiResponse<User>),
        (status = 400, description = "Validation failed or email taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    auth_service::register_user(&state.pool, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    auth_service::login_user(&state.pool, payload).await.map(Json)
}

// Tokens are stateless; the client just drops its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout"),
    ),
    tag = "Auth"
)]
pub async fn logout() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        "Logged out successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token"),
    ),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    auth_service::current_user(&state.pool, &user).await.map(Json)
}
