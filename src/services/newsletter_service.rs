use uuid::Uuid;

use crate::{
    checkout::is_valid_email,
    db::DbPool,
    dto::newsletter::{
        SendNewsletterRequest, SendReport, SubscribeRequest, SubscriberList, UnsubscribeRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::NewsletterSubscriber,
    response::{ApiResponse, FieldError, Meta},
};

pub async fn subscribe(
    pool: &DbPool,
    payload: SubscribeRequest,
) -> AppResult<ApiResponse<NewsletterSubscriber>> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "Valid email is required",
        )]));
    }
    let email = payload.email.trim().to_lowercase();

    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM newsletter_subscribers WHERE email = $1")
            .bind(&email)
            .fetch_optional(pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "Email is already subscribed to our newsletter".to_string(),
        ));
    }

    let subscriber: NewsletterSubscriber = sqlx::query_as(
        "INSERT INTO newsletter_subscribers (id, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .fetch_one(pool)
    .await?;

    // Welcome email delivery is handled by an external mailer.
    tracing::info!(email = %subscriber.email, "newsletter subscription");

    Ok(ApiResponse::success(
        "Successfully subscribed to newsletter!",
        subscriber,
        Some(Meta::empty()),
    ))
}

pub async fn unsubscribe(
    pool: &DbPool,
    payload: UnsubscribeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "Valid email is required",
        )]));
    }
    let email = payload.email.trim().to_lowercase();

    let result = sqlx::query("DELETE FROM newsletter_subscribers WHERE email = $1")
        .bind(&email)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Email is not subscribed to our newsletter".to_string(),
        ));
    }

    tracing::info!(email = %email, "newsletter unsubscription");

    Ok(ApiResponse::success(
        "Successfully unsubscribed from newsletter",
        serde_json::json!({ "email": email }),
        Some(Meta::empty()),
    ))
}

pub async fn list_subscribers(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<SubscriberList>> {
    ensure_admin(user)?;

    let subscribers: Vec<NewsletterSubscriber> =
        sqlx::query_as("SELECT * FROM newsletter_subscribers ORDER BY subscribed_at DESC")
            .fetch_all(pool)
            .await?;

    let total = subscribers.len() as i64;
    Ok(ApiResponse::success(
        "Subscribers",
        SubscriberList { subscribers, total },
        None,
    ))
}

pub async fn send_newsletter(
    pool: &DbPool,
    user: &AuthUser,
    payload: SendNewsletterRequest,
) -> AppResult<ApiResponse<SendReport>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    if payload.subject.trim().is_empty() {
        errors.push(FieldError::new("subject", "Subject is required"));
    }
    if payload.content.trim().is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM newsletter_subscribers")
        .fetch_one(pool)
        .await?;
    if total.0 == 0 {
        return Err(AppError::BadRequest("No subscribers found".to_string()));
    }

    // Actual delivery goes through the external mailer; the service records
    // the dispatch and reports the recipient count.
    tracing::info!(
        subject = %payload.subject.trim(),
        recipients = total.0,
        "newsletter dispatched"
    );

    Ok(ApiResponse::success(
        "Newsletter sent successfully",
        SendReport { sent: total.0 },
        Some(Meta::empty()),
    ))
}
