use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, FieldError, Meta},
};

pub async fn list_reviews(pool: &DbPool, product_id: Uuid) -> AppResult<ApiResponse<ReviewList>> {
    let items: Vec<Review> =
        sqlx::query_as("SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC")
            .bind(product_id)
            .fetch_all(pool)
            .await?;

    let total = items.len() as i64;
    let meta = Meta::new(1, total.max(1), total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn add_review(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    validate_review_fields(
        Some(payload.rating),
        payload.title.as_deref(),
        Some(payload.comment.as_str()),
    )?;

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM reviews WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "You have already reviewed this product".to_string(),
        ));
    }

    // Reviews can outlive the account row, so the display name is captured
    // at write time.
    let reviewer: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let reviewer_name = reviewer.map_or_else(|| "Customer".to_string(), |(name,)| name);

    let review: Review = sqlx::query_as(
        r#"
        INSERT INTO reviews (id, product_id, user_id, reviewer_name, rating, title, comment)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(user.user_id)
    .bind(reviewer_name)
    .bind(payload.rating)
    .bind(payload.title)
    .bind(payload.comment.trim())
    .fetch_one(pool)
    .await?;

    refresh_product_rating(pool, product_id).await?;

    tracing::info!(review_id = %review.id, product_id = %product_id, rating = review.rating, "review added");

    Ok(ApiResponse::success(
        "Review added",
        review,
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    validate_review_fields(payload.rating, payload.title.as_deref(), payload.comment.as_deref())?;

    let existing = find_owned_review(pool, user, id).await?;

    let review: Review = sqlx::query_as(
        r#"
        UPDATE reviews
        SET rating = $2,
            title = $3,
            comment = $4,
            updated_at = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.rating.unwrap_or(existing.rating))
    .bind(payload.title.or(existing.title))
    .bind(payload.comment.unwrap_or(existing.comment))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    refresh_product_rating(pool, review.product_id).await?;

    Ok(ApiResponse::success(
        "Review updated",
        review,
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_owned_review(pool, user, id).await?;

    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    refresh_product_rating(pool, existing.product_id).await?;

    tracing::info!(review_id = %id, product_id = %existing.product_id, "review deleted");

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Fetch a review, requiring the caller to be its author or an admin.
async fn find_owned_review(pool: &DbPool, user: &AuthUser, id: Uuid) -> AppResult<Review> {
    let review: Option<Review> = sqlx::query_as("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let review = match review {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    if review.user_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(review)
}

/// Recompute the product's aggregate rating and review count from its
/// current reviews. Zero reviews resets both to zero.
async fn refresh_product_rating(pool: &DbPool, product_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET rating = COALESCE((SELECT AVG(rating)::float8 FROM reviews WHERE product_id = $1), 0),
            reviews = (SELECT COUNT(*) FROM reviews WHERE product_id = $1),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(())
}

fn validate_review_fields(
    rating: Option<i32>,
    title: Option<&str>,
    comment: Option<&str>,
) -> AppResult<()> {
    let mut errors = Vec::new();
    if let Some(rating) = rating {
        if !(1..=5).contains(&rating) {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
        }
    }
    if let Some(title) = title {
        if title.len() > 100 {
            errors.push(FieldError::new("title", "Title cannot exceed 100 characters"));
        }
    }
    if let Some(comment) = comment {
        if comment.trim().is_empty() {
            errors.push(FieldError::new("comment", "Comment is required"));
        } else if comment.len() > 500 {
            errors.push(FieldError::new(
                "comment",
                "Comment cannot exceed 500 characters",
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        assert!(validate_review_fields(Some(1), None, Some("Fine")).is_ok());
        assert!(validate_review_fields(Some(5), None, Some("Great")).is_ok());
        assert!(validate_review_fields(Some(0), None, Some("Bad")).is_err());
        assert!(validate_review_fields(Some(6), None, Some("Too good")).is_err());
    }

    #[test]
    fn comment_is_required_and_bounded() {
        assert!(validate_review_fields(Some(4), None, Some("   ")).is_err());
        let long = "x".repeat(501);
        assert!(validate_review_fields(Some(4), None, Some(&long)).is_err());
    }
}
