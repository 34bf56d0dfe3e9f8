use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{error, info};
use uuid::Uuid;

use barter_db::Database;
use barter_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use barter_types::validation::ValidationErrors;

use crate::error::ApiError;
use crate::run_db;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

const TOKEN_LIFETIME_DAYS: i64 = 30;
const USERNAME_TAKEN: &str = "username is already taken";

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = ValidationErrors::default();
    let username_len = req.username.chars().count();
    if !(3..=32).contains(&username_len) {
        errors.add("username", "must be between 3 and 32 characters");
    }
    if req.password.chars().count() < 8 {
        errors.add("password", "must be at least 8 characters");
    }
    errors.finish(())?;

    // Check if username is taken
    let username = req.username.clone();
    if run_db(&state, move |db| db.get_user_by_username(&username)).await?.is_some() {
        return Err(ApiError::Conflict(USERNAME_TAKEN));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    let username = req.username.clone();
    // A concurrent registration can still claim the name between the check
    // above and this insert.
    run_db(&state, move |db| db.create_user(user_id, &username, &password_hash))
        .await
        .map_err(username_conflict)?;

    let token = create_token(&state.jwt_secret, user_id, &req.username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::Internal
    })?;

    info!(user_id = %user_id, username = %req.username, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = run_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
        error!("Stored password hash for '{}' is unreadable: {}", user.username, e);
        ApiError::Internal
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal)?;

    let token = create_token(&state.jwt_secret, user_id, &user.username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

fn username_conflict(err: ApiError) -> ApiError {
    match err {
        ApiError::Db(e) if e.is_constraint_violation() => ApiError::Conflict(USERNAME_TAKEN),
        other => other,
    }
}

/// Mint an HS256 token identifying `user_id`.
pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
