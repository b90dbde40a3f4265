//! Authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{hash_password, validate_email, validate_password, validate_username};
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UserInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/auth/register - User registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    // Validate input
    validate_username(&req.username).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    validate_email(&req.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {e}")))?;

    // Hash password
    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    // Create user
    let user = {
        let repo = UserRepository::new(state.db.pool());
        repo.create(&NewUser::new(&req.username, &req.email, password_hash))
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE") {
                    if msg.contains("users.email") {
                        ApiError::conflict("Email already registered")
                    } else {
                        ApiError::conflict("Username already taken")
                    }
                } else {
                    tracing::error!("User creation failed: {}", e);
                    ApiError::internal("Failed to create user")
                }
            })?
    };

    let access_token = state.generate_access_token(user.id, &user.username)?;

    let response = LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    // Unknown user and wrong password are deliberately indistinguishable
    let user = {
        let repo = UserRepository::new(state.db.pool());
        repo.get_by_username(&req.username)
            .await
            .map_err(|_| ApiError::unauthorized("Invalid username or password"))?
            .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?
    };

    crate::auth::verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    let access_token = state.generate_access_token(user.id, &user.username)?;

    let response = LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/auth/me - Get current user info.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = {
        let repo = UserRepository::new(state.db.pool());
        repo.get_by_id(claims.sub)
            .await
            .map_err(|_| ApiError::internal("Database error"))?
            .ok_or_else(|| ApiError::not_found("User not found"))?
    };

    let response = MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    };

    Ok(Json(ApiResponse::new(response)))
}
