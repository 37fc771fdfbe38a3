//! SQLite persistence for users and their saved watch-lists.

use crate::types::{Subscription, SubscriptionStatus, UserRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const USER_COLUMNS: &str = "id, name, email, password_hash, password_salt,
    subscription_status, subscription_expiry, created_at";

/// SQLite store for users and watch-lists.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-written that SQLite
        // itself has not already rolled back.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn();

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                password_salt TEXT NOT NULL,
                subscription_status TEXT NOT NULL DEFAULT 'active',
                subscription_expiry INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_tickers (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                ticker TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE(user_id, ticker)
            );

            CREATE INDEX IF NOT EXISTS idx_user_tickers_user
                ON user_tickers(user_id, position);",
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    // ========== User Methods ==========

    /// Insert a new user. Returns false if the email is already taken.
    pub fn create_user(&self, user: &UserRecord) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, password_salt,
                subscription_status, subscription_expiry, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(email) DO NOTHING",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.password_salt,
                user.subscription.status.as_str(),
                user.subscription.expiry_date,
                user.created_at,
            ],
        )?;

        if inserted == 1 {
            debug!("Created user {}", user.id);
        }
        Ok(inserted == 1)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            user_from_row,
        )
        .optional()
    }

    /// Look up a user by (already lowercased) email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![email],
            user_from_row,
        )
        .optional()
    }

    pub fn update_subscription(
        &self,
        user_id: &str,
        subscription: &Subscription,
    ) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let updated = conn.execute(
            "UPDATE users SET subscription_status = ?1, subscription_expiry = ?2 WHERE id = ?3",
            params![subscription.status.as_str(), subscription.expiry_date, user_id],
        )?;
        Ok(updated == 1)
    }

    /// Delete a user and, through the cascade, their watch-list.
    #[cfg(test)]
    pub fn delete_user(&self, user_id: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(deleted == 1)
    }

    #[cfg(test)]
    pub fn user_count(&self) -> Result<usize, rusqlite::Error> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Watch-list Methods ==========

    /// Saved tickers for a user, in saved order.
    pub fn user_tickers(&self, user_id: &str) -> Result<Vec<String>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT ticker FROM user_tickers WHERE user_id = ?1 ORDER BY position ASC",
        )?;
        let tickers = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tickers)
    }

    /// Replace a user's watch-list in one transaction.
    pub fn replace_user_tickers(
        &self,
        user_id: &str,
        tickers: &[String],
    ) -> Result<(), rusqlite::Error> {
        let mut conn = self.conn();
        let now = chrono::Utc::now().timestamp_millis();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM user_tickers WHERE user_id = ?1", params![user_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO user_tickers (user_id, ticker, position, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, ticker) in tickers.iter().enumerate() {
                stmt.execute(params![user_id, ticker, position as i64, now])?;
            }
        }
        tx.commit()?;

        debug!("Saved {} tickers for user {}", tickers.len(), user_id);
        Ok(())
    }
}

fn user_from_row(row: &Row<'_>) -> Result<UserRecord, rusqlite::Error> {
    let status: String = row.get(5)?;
    let status = SubscriptionStatus::from_str(&status).unwrap_or_else(|| {
        warn!("Unknown subscription status '{}', treating as expired", status);
        SubscriptionStatus::Expired
    });

    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        password_salt: row.get(4)?,
        subscription: Subscription {
            status,
            expiry_date: row.get(6)?,
        },
        created_at: row.get(7)?,
    })
}
