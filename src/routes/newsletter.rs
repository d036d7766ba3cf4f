use axum::{
    Json, Router,
    extract::State,
};

use crate::{
    dto::newsletter::{
        SendNewsletterRequest, SendReport, SubscribeRequest, SubscriberList, UnsubscribeRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::NewsletterSubscriber,
    response::ApiResponse,
    services::newsletter_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", axum::routing::post(subscribe))
        .route("/unsubscribe", axum::routing::post(unsubscribe))
        .route("/subscribers", axum::routing::get(list_subscribers))
        .route("/send", axum::routing::post(send_newsletter))
}

#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribe to newsletter", body = ApiResponse<NewsletterSubscriber>),
        (status = 400, description = "Invalid email or already subscribed"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<NewsletterSubscriber>>> {
    newsletter_service::subscribe(&state.pool, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/newsletter/unsubscribe",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribe from newsletter"),
        (status = 400, description = "Email is not subscribed"),
    ),
    tag = "Newsletter"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    newsletter_service::unsubscribe(&state.pool, payload)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/newsletter/subscribers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List subscribers", body = ApiResponse<SubscriberList>),
        (status = 403, description = "Admin only"),
    ),
    tag = "Newsletter"
)]
pub async fn list_subscribers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SubscriberList>>> {
    newsletter_service::list_subscribers(&state.pool, &user)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/newsletter/send",
    request_body = SendNewsletterRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Send newsletter to all subscribers", body = ApiResponse<SendReport>),
        (status = 400, description = "Validation failed or no subscribers"),
        (status = 403, description = "Admin only"),
    ),
    tag = "Newsletter"
)]
pub async fn send_newsletter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendNewsletterRequest>,
) -> AppResult<Json<ApiResponse<SendReport>>> {
    newsletter_service::send_newsletter(&state.pool, &user, payload)
        .await
        .map(Json)
}
