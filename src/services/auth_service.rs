use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    checkout::is_valid_email,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserInfo},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, FieldError, Meta},
};

pub async fn register_user(pool: &DbPool, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;

    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Valid email is required"));
    }
    if password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Stored lowercased; the duplicate check must use the same form or a
    // case-variant retry slips past it and trips the unique index instead.
    let email = email.trim().to_lowercase();

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "User already exists with this email".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(&email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::unauthorized("Invalid credentials")),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = %user.id, "user logged in");

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    };

    Ok(ApiResponse::success("Login successful", resp, Some(Meta::empty())))
}

pub async fn current_user(pool: &DbPool, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(pool)
        .await?;

    match user {
        Some(user) => Ok(ApiResponse::success("OK", user, None)),
        None => Err(AppError::unauthorized("Invalid token")),
    }
}
