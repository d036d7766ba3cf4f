use chrono::Utc;
use uuid::Uuid;

use crate::{
    checkout::is_valid_email,
    db::DbPool,
    dto::contact::{ContactList, CreateContactRequest, RespondContactRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::ContactMessage,
    response::{ApiResponse, FieldError, Meta},
    routes::params::ContactListQuery,
};

pub const CONTACT_SUBJECTS: [&str; 6] = ["general", "product", "order", "return", "feedback", "other"];

pub async fn submit_contact(
    pool: &DbPool,
    payload: CreateContactRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if payload.name.len() > 100 {
        errors.push(FieldError::new("name", "Name cannot exceed 100 characters"));
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Valid email is required"));
    }
    if !CONTACT_SUBJECTS.contains(&payload.subject.trim().to_lowercase().as_str()) {
        errors.push(FieldError::new("subject", "Invalid subject"));
    }
    if payload.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    } else if payload.message.len() > 1000 {
        errors.push(FieldError::new(
            "message",
            "Message cannot exceed 1000 characters",
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let contact: ContactMessage = sqlx::query_as(
        r#"
        INSERT INTO contacts (id, name, email, phone, subject, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.name.trim())
    .bind(payload.email.trim().to_lowercase())
    .bind(payload.phone)
    .bind(payload.subject.trim().to_lowercase())
    .bind(payload.message.trim())
    .fetch_one(pool)
    .await?;

    tracing::info!(contact_id = %contact.id, subject = %contact.subject, "contact message received");

    Ok(ApiResponse::success(
        "Message sent successfully",
        contact,
        Some(Meta::empty()),
    ))
}

pub async fn list_contacts(
    pool: &DbPool,
    user: &AuthUser,
    query: ContactListQuery,
) -> AppResult<ApiResponse<ContactList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let (items, total): (Vec<ContactMessage>, i64) = match query.status.as_ref().filter(|s| !s.is_empty()) {
        Some(status) => {
            let items = sqlx::query_as(
                "SELECT * FROM contacts WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE status = $1")
                .bind(status)
                .fetch_one(pool)
                .await?;
            (items, total.0)
        }
        None => {
            let items = sqlx::query_as(
                "SELECT * FROM contacts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
                .fetch_one(pool)
                .await?;
            (items, total.0)
        }
    };

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Contacts", ContactList { items }, Some(meta)))
}

/// Admin view of a single message. Opening it marks it read.
pub async fn get_contact(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ContactMessage>> {
    ensure_admin(user)?;

    let contact: Option<ContactMessage> =
        sqlx::query_as("UPDATE contacts SET is_read = TRUE WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    match contact {
        Some(contact) => Ok(ApiResponse::success("Contact message", contact, None)),
        None => Err(AppError::NotFound),
    }
}

pub async fn respond_contact(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: RespondContactRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    ensure_admin(user)?;

    if payload.response.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "response",
            "Response is required",
        )]));
    }

    let contact: Option<ContactMessage> = sqlx::query_as(
        r#"
        UPDATE contacts
        SET response = $2,
            assigned_to = $3,
            responded_at = $4,
            status = 'resolved',
            is_read = TRUE
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.response.trim())
    .bind(payload.assigned_to)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    let contact = match contact {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    tracing::info!(contact_id = %contact.id, "contact message resolved");

    Ok(ApiResponse::success(
        "Response recorded",
        contact,
        Some(Meta::empty()),
    ))
}
