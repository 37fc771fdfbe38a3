//! Authentication Service
//!
//! Email/password accounts with Argon2id password hashes, in-memory bearer
//! sessions and subscription checks.
//!
//! Storage:
//! - SQLite: users (long-term persistence)
//! - DashMap: sessions (expire after `SESSION_TTL_DAYS`)

use crate::services::SqliteStore;
use crate::types::{
    AuthResponse, RegisterRequest, Session, Subscription, SubscriptionStatus, UserRecord, UserView,
};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use dashmap::DashMap;
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;
const SALT_LEN: usize = 16;

/// Authentication service for accounts and sessions.
#[derive(Clone)]
pub struct AuthService {
    /// Active sessions (token -> Session)
    sessions: Arc<DashMap<String, Session>>,
    store: Arc<SqliteStore>,
    session_ttl_days: u32,
    subscription_days: u32,
}

impl AuthService {
    pub fn new(store: Arc<SqliteStore>, session_ttl_days: u32, subscription_days: u32) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            session_ttl_days,
            subscription_days,
        }
    }

    /// Create an account with a fresh subscription and sign it in.
    pub fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);
        let password = request.password.as_str();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let salt = random_salt()?;
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            password_hash: hash_password(&salt, password)?,
            password_salt: salt.as_str().to_string(),
            subscription: Subscription::trial(self.subscription_days),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        if !self.store.create_user(&user)? {
            return Err(AuthError::EmailTaken);
        }

        info!("Registered user {}", user.id);
        Ok(self.start_session(&user))
    }

    /// Check credentials and start a session.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let user = self
            .store
            .get_user_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&user, password) {
            warn!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        Ok(self.start_session(&user))
    }

    /// Resolve a bearer token to its user.
    pub fn validate_session(&self, token: &str) -> Result<UserRecord, AuthError> {
        let session = self
            .sessions
            .get(token)
            .map(|s| s.clone())
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            self.sessions.remove(token);
            debug!("Session for user {} expired", session.user_id);
            return Err(AuthError::SessionNotFound);
        }

        let mut user = self
            .store
            .get_user(&session.user_id)?
            .ok_or(AuthError::SessionNotFound)?;
        self.expire_if_lapsed(&mut user)?;
        Ok(user)
    }

    /// Persist `Expired` once an active subscription runs past its expiry.
    fn expire_if_lapsed(&self, user: &mut UserRecord) -> Result<(), AuthError> {
        let subscription = &user.subscription;
        if subscription.status != SubscriptionStatus::Active || subscription.is_active() {
            return Ok(());
        }

        let expired = Subscription {
            status: SubscriptionStatus::Expired,
            expiry_date: subscription.expiry_date,
        };
        if self.store.update_subscription(&user.id, &expired)? {
            info!("Subscription for user {} expired", user.id);
            user.subscription = expired;
        }
        Ok(())
    }

    /// Invalidate a session token. Returns whether it existed.
    pub fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.remove(token);
        if let Some((_, session)) = &removed {
            info!("User {} logged out", session.user_id);
        }
        removed.is_some()
    }

    /// Fail unless the user's subscription is open.
    pub fn require_active_subscription(&self, user: &UserRecord) -> Result<(), AuthError> {
        if user.subscription.is_active() {
            Ok(())
        } else {
            Err(AuthError::SubscriptionInactive)
        }
    }

    /// Drop expired sessions.
    pub fn purge_expired_sessions(&self) {
        self.sessions.retain(|_, session| !session.is_expired());
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn start_session(&self, user: &UserRecord) -> AuthResponse {
        let session = Session::new(user.id.clone(), self.session_ttl_days);
        self.sessions.insert(session.token.clone(), session.clone());

        AuthResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: UserView::from(user),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn random_salt() -> Result<SaltString, AuthError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    SaltString::encode_b64(&salt).map_err(|e| {
        error!("Salt encoding failed: {}", e);
        AuthError::Internal
    })
}

/// Argon2id PHC string for the password under the given salt.
fn hash_password(salt: &SaltString, password: &str) -> Result<String, AuthError> {
    Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            AuthError::Internal
        })
}

/// Verify against the stored PHC string; the salt and cost travel inside it.
fn verify_password(user: &UserRecord, password: &str) -> bool {
    let Ok(expected) = PasswordHash::new(&user.password_hash) else {
        error!("Corrupt password hash for user {}", user.id);
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &expected)
        .is_ok()
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Name, email and password are required")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Subscription inactive")]
    SubscriptionInactive,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Internal error")]
    Internal,
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AuthError::MissingFields | AuthError::InvalidEmail | AuthError::PasswordTooShort => {
                StatusCode::BAD_REQUEST
            }
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::SubscriptionInactive => StatusCode::FORBIDDEN,
            AuthError::Storage(e) => {
                error!("Auth storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AuthError::Storage(_) => "Internal error".to_string(),
            other => other.to_string(),
        };

        let body = axum::Json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
