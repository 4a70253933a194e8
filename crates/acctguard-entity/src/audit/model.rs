//! Audit event entity model.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserAuthRecord;

/// Severity attached to an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// Audit category. Everything this core emits is a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    #[default]
    Security,
}

/// The kind of security event recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// A standard (time-boxed) lock was applied.
    AccountLocked,
    /// A standard lock was escalated to a security lock.
    AccountLockoutUpgraded,
    /// A security lock was applied without a prior standard lock.
    AccountSecurityLocked,
    /// An administrator locked the account.
    AccountManuallyLocked,
    /// An administrator cleared every lock.
    AccountUnlocked,
    /// The sweep released lapsed standard locks.
    AccountsAutoUnlocked,
    /// A login was refused because the account is locked.
    LoginBlocked,
    /// A login was refused because the password and its grace period expired.
    PasswordExpiredLoginDenied,
    /// A post-expiration grace period began.
    GracePeriodStarted,
    /// A session was issued.
    SessionCreated,
    /// An older session was removed to respect the concurrency cap.
    SessionEvicted,
}

impl AuditEventType {
    /// Return the event type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AccountLockoutUpgraded => "ACCOUNT_LOCKOUT_UPGRADED",
            Self::AccountSecurityLocked => "ACCOUNT_SECURITY_LOCKED",
            Self::AccountManuallyLocked => "ACCOUNT_MANUALLY_LOCKED",
            Self::AccountUnlocked => "ACCOUNT_UNLOCKED",
            Self::AccountsAutoUnlocked => "ACCOUNTS_AUTO_UNLOCKED",
            Self::LoginBlocked => "LOGIN_BLOCKED",
            Self::PasswordExpiredLoginDenied => "PASSWORD_EXPIRED_LOGIN_DENIED",
            Self::GracePeriodStarted => "GRACE_PERIOD_STARTED",
            Self::SessionCreated => "SESSION_CREATED",
            Self::SessionEvicted => "SESSION_EVICTED",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request metadata the HTTP layer passes through for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client address.
    pub ip_address: Option<IpAddr>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Request path.
    pub route: Option<String>,
    /// HTTP method.
    pub method: Option<String>,
}

impl RequestContext {
    /// Context with only an address and agent, as seen on a login request.
    pub fn new(ip_address: Option<IpAddr>, user_agent: Option<&str>) -> Self {
        Self {
            ip_address,
            user_agent: user_agent.map(String::from),
            route: None,
            method: None,
        }
    }

    /// Attaches the route and method.
    pub fn with_route(mut self, method: impl Into<String>, route: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.route = Some(route.into());
        self
    }
}

/// One security audit record handed to the audit sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// What happened.
    pub event_type: AuditEventType,
    /// Event category.
    pub category: AuditCategory,
    /// How urgent the event is.
    pub severity: AuditSeverity,
    /// The acting user (the account owner, or the administrator).
    pub actor_user_id: Option<Uuid>,
    /// The acting user's login name.
    pub actor_username: Option<String>,
    /// The acting user's role.
    pub actor_role: Option<String>,
    /// Client address.
    pub ip_address: Option<IpAddr>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Request path.
    pub route: Option<String>,
    /// HTTP method.
    pub method: Option<String>,
    /// Whether the actor was authenticated when the event occurred.
    pub authenticated: bool,
    /// Whether the triggering request was refused.
    pub blocked: bool,
    /// Why the request was refused.
    pub block_reason: Option<String>,
    /// Event-specific details.
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Starts an event of the given type.
    pub fn new(
        event_type: AuditEventType,
        severity: AuditSeverity,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            category: AuditCategory::Security,
            severity,
            actor_user_id: None,
            actor_username: None,
            actor_role: None,
            ip_address: None,
            user_agent: None,
            route: None,
            method: None,
            authenticated: false,
            blocked: false,
            block_reason: None,
            extra: serde_json::Map::new(),
            occurred_at,
        }
    }

    /// Sets the actor from a user record.
    pub fn actor(mut self, user: &UserAuthRecord) -> Self {
        self.actor_user_id = Some(user.id);
        self.actor_username = Some(user.username.clone());
        self.actor_role = Some(user.role.clone());
        self
    }

    /// Sets only the actor id, for administrators not loaded from the store.
    pub fn actor_id(mut self, id: Uuid) -> Self {
        self.actor_user_id = Some(id);
        self
    }

    /// Copies the request metadata.
    pub fn request(mut self, ctx: &RequestContext) -> Self {
        self.ip_address = ctx.ip_address;
        self.user_agent = ctx.user_agent.clone();
        self.route = ctx.route.clone();
        self.method = ctx.method.clone();
        self
    }

    /// Marks the actor as authenticated.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// Marks the request as refused.
    pub fn blocked(mut self, reason: impl Into<String>) -> Self {
        self.blocked = true;
        self.block_reason = Some(reason.into());
        self
    }

    /// Adds one detail field.
    pub fn extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}
