//! Authentication API
//!
//! Flow:
//! 1. POST /api/auth/register - Create an account and get a bearer token
//! 2. POST /api/auth/login - Exchange email/password for a bearer token
//! 3. GET /api/auth/validate - Resolve the current token to its user
//! 4. POST /api/auth/logout - Invalidate the current token

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::services::{AuthError, AuthService};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, UserRecord, UserView};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/validate", get(validate))
        .route("/logout", post(logout))
}

/// POST /api/auth/register
async fn register(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(auth.register(&request)?))
}

/// POST /api/auth/login
async fn login(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(auth.login(&request.email, &request.password)?))
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user: UserView,
}

/// GET /api/auth/validate
async fn validate(auth: Authenticated) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: true,
        user: UserView::from(&auth.user),
    })
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// POST /api/auth/logout
async fn logout(
    State(service): State<Arc<AuthService>>,
    auth: Authenticated,
) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        success: service.logout(&auth.token),
    })
}

/// Authenticated user extractor.
///
/// Requires an `Authorization: Bearer <token>` header naming a live session.
pub struct Authenticated {
    pub token: String,
    pub user: UserRecord,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = Arc::<AuthService>::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let user = auth_service.validate_session(token)?;

        Ok(Authenticated {
            token: token.to_string(),
            user,
        })
    }
}

/// Authenticated user whose subscription is active.
pub struct Subscribed(pub UserRecord);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Subscribed
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Authenticated::from_request_parts(parts, state).await?;
        Arc::<AuthService>::from_ref(state).require_active_subscription(&auth.user)?;
        Ok(Subscribed(auth.user))
    }
}
