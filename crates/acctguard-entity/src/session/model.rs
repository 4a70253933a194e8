//! Session entity model.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated session.
///
/// Sessions are created on login and deleted on logout, administrator
/// termination, expiry sweep, or eviction by a newer login. The expiry is
/// absolute: activity moves `last_activity` but never `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Opaque bearer token, hex-encoded random bytes.
    pub session_token: String,
    /// Client address at login.
    pub ip_address: Option<IpAddr>,
    /// User-Agent header at login.
    pub user_agent: Option<String>,
    /// Device classification derived from the user agent.
    pub device_info: String,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last authenticated request.
    pub last_activity: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Flagged by the caller as anomalous at creation.
    pub is_suspicious: bool,
}

impl Session {
    /// Whether the session can no longer be used at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Row predicate for session queries. Every populated field must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Restrict to one user.
    pub user_id: Option<Uuid>,
    /// `expires_at` must be strictly after this instant.
    pub expires_after: Option<DateTime<Utc>>,
}

impl SessionFilter {
    /// Non-expired sessions of one user at `now`.
    pub fn active_for(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id),
            expires_after: Some(now),
        }
    }

    /// Evaluates the predicate against a session.
    pub fn matches(&self, session: &Session) -> bool {
        if self.user_id.is_some_and(|id| id != session.user_id) {
            return false;
        }
        if self.expires_after.is_some_and(|t| session.expires_at <= t) {
            return false;
        }
        true
    }
}

/// Sort order for session listings.
///
/// Equal `created_at` values are always returned in store insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrder {
    /// Oldest first; used for eviction.
    CreatedAtAsc,
    /// Newest first; used for listings.
    CreatedAtDesc,
}
