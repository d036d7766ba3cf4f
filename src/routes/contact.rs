use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::contact::{ContactList, CreateContactRequest, RespondContactRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ContactMessage,
    response::ApiResponse,
    routes::params::ContactListQuery,
    services::contact_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(submit_contact))
        .route("/", axum::routing::get(list_contacts))
        .route("/{id}", axum::routing::get(get_contact))
        .route("/{id}/respond", axum::routing::patch(respond_contact))
}

#[utoipa::path(
    get,
    path = "/api/contact/{id}",
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Get contact message and mark it read", body = ApiResponse<ContactMessage>),
        (status = 404, description = "Message not found"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Contact"
)]
pub async fn get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContactMessage>>> {
    contact_service::get_contact(&state.pool, &user, id)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = CreateContactRequest,
    responses(
        (status = 200, description = "Submit contact message", body = ApiResponse<ContactMessage>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Contact"
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<Json<ApiResponse<ContactMessage>>> {
    contact_service::submit_contact(&state.pool, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/contact",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List contact messages", body = ApiResponse<ContactList>),
        (status = 403, description = "Admin only"),
    ),
    tag = "Contact"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ContactListQuery>,
) -> AppResult<Json<ApiResponse<ContactList>>> {
    contact_service::list_contacts(&state.pool, &user, query)
        .await
        .map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/contact/{id}/respond",
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    request_body = RespondContactRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Respond to a contact message", body = ApiResponse<ContactMessage>),
        (status = 404, description = "Message not found"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Contact"
)]
pub async fn respond_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RespondContactRequest>,
) -> AppResult<Json<ApiResponse<ContactMessage>>> {
    contact_service::respond_contact(&state.pool, &user, id, payload)
        .await
        .map(Json)
}
