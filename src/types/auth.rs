//! Authentication Types
//!
//! Users, subscriptions and bearer sessions for the scanner API.

use serde::{Deserialize, Serialize};

/// Milliseconds per day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Subscription state stored with each user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from the stored column value.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A user's subscription window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub status: SubscriptionStatus,
    /// Expiry timestamp (ms)
    pub expiry_date: i64,
}

impl Subscription {
    /// Active subscription starting now and lasting `days`.
    pub fn trial(days: u32) -> Self {
        Self {
            status: SubscriptionStatus::Active,
            expiry_date: chrono::Utc::now().timestamp_millis() + days as i64 * DAY_MS,
        }
    }

    /// Active status and an expiry in the future.
    pub fn is_active_at(&self, now_ms: i64) -> bool {
        self.status == SubscriptionStatus::Active && self.expiry_date > now_ms
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(chrono::Utc::now().timestamp_millis())
    }

    /// Whole days left until expiry, rounded up, never negative.
    pub fn days_left_at(&self, now_ms: i64) -> i64 {
        let remaining = self.expiry_date - now_ms;
        if remaining <= 0 {
            0
        } else {
            (remaining + DAY_MS - 1) / DAY_MS
        }
    }
}

/// Registered user as stored in the database.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    /// Lowercased email (unique)
    pub email: String,
    /// Argon2id PHC string of the password
    pub password_hash: String,
    /// B64 salt, also embedded in `password_hash`
    pub password_salt: String,
    pub subscription: Subscription,
    /// When account was created (ms)
    pub created_at: i64,
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subscription: SubscriptionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    /// "active" only while the subscription window is open
    pub status: SubscriptionStatus,
    pub expiry_date: i64,
    pub days_left: i64,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let status = if user.subscription.is_active_at(now) {
            SubscriptionStatus::Active
        } else if user.subscription.status == SubscriptionStatus::Active {
            SubscriptionStatus::Expired
        } else {
            user.subscription.status
        };

        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            subscription: SubscriptionView {
                status,
                expiry_date: user.subscription.expiry_date,
                days_left: user.subscription.days_left_at(now),
            },
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response for successful register/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// When the token expires (ms)
    pub expires_at: i64,
    pub user: UserView,
}

/// Bearer session held in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    /// When session was created (ms)
    pub created_at: i64,
    /// When session expires (ms)
    pub expires_at: i64,
}

impl Session {
    /// Create a new session with a random 32-byte token.
    pub fn new(user_id: String, ttl_days: u32) -> Self {
        use rand::Rng;
        let now = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let token: String = (0..32)
            .map(|_| format!("{:02x}", rng.gen::<u8>()))
            .collect();

        Self {
            token,
            user_id,
            created_at: now,
            expires_at: now + ttl_days as i64 * DAY_MS,
        }
    }

    /// Check if session has expired.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Subscription Tests
    // =========================================================================

    #[test]
    fn test_trial_subscription_is_active() {
        let sub = Subscription::trial(30);
        assert!(sub.is_active());
        let now = chrono::Utc::now().timestamp_millis();
        assert_eq!(sub.days_left_at(now), 30);
    }

    #[test]
    fn test_expired_subscription() {
        let sub = Subscription {
            status: SubscriptionStatus::Active,
            expiry_date: 1_000,
        };
        assert!(!sub.is_active_at(2_000));
        assert_eq!(sub.days_left_at(2_000), 0);
    }

    #[test]
    fn test_cancelled_subscription_not_active() {
        let sub = Subscription {
            status: SubscriptionStatus::Cancelled,
            expiry_date: i64::MAX,
        };
        assert!(!sub.is_active_at(0));
    }

    #[test]
    fn test_days_left_rounds_up() {
        let sub = Subscription {
            status: SubscriptionStatus::Active,
            expiry_date: DAY_MS + 1,
        };
        assert_eq!(sub.days_left_at(0), 2);
    }

    #[test]
    fn test_subscription_status_parse() {
        assert_eq!(SubscriptionStatus::from_str("ACTIVE"), Some(SubscriptionStatus::Active));
        assert_eq!(SubscriptionStatus::from_str("canceled"), Some(SubscriptionStatus::Cancelled));
        assert_eq!(SubscriptionStatus::from_str("bogus"), None);
    }

    // =========================================================================
    // UserView Tests
    // =========================================================================

    #[test]
    fn test_user_view_reports_lapsed_subscription_as_expired() {
        let user = UserRecord {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            password_salt: String::new(),
            subscription: Subscription {
                status: SubscriptionStatus::Active,
                expiry_date: 1_000,
            },
            created_at: 0,
        };
        let view = UserView::from(&user);
        assert_eq!(view.subscription.status, SubscriptionStatus::Expired);
        assert_eq!(view.subscription.days_left, 0);
    }

    #[test]
    fn test_user_view_serialization() {
        let user = UserRecord {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "secret".to_string(),
            password_salt: "salt".to_string(),
            subscription: Subscription::trial(30),
            created_at: 0,
        };
        let json = serde_json::to_string(&UserView::from(&user)).unwrap();
        assert!(json.contains("\"expiryDate\""));
        assert!(json.contains("\"daysLeft\":30"));
        assert!(!json.contains("secret"));
    }

    // =========================================================================
    // Session Tests
    // =========================================================================

    #[test]
    fn test_session_creation() {
        let session = Session::new("u1".to_string(), 30);
        assert_eq!(session.token.len(), 64);
        assert!(!session.is_expired());
        assert_eq!(session.expires_at - session.created_at, 30 * DAY_MS);
    }

    #[test]
    fn test_session_tokens_unique() {
        let a = Session::new("u1".to_string(), 1);
        let b = Session::new("u1".to_string(), 1);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_register_request_missing_fields_default_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }
}
