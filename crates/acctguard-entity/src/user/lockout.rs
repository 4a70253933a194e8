//! Account lock enumerations and the tagged lock state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an account was locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockoutReason {
    /// Too many consecutive failed logins.
    FailedAttempts,
    /// An administrator locked the account.
    AdminLock,
}

impl LockoutReason {
    /// Return the reason as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedAttempts => "FAILED_ATTEMPTS",
            Self::AdminLock => "ADMIN_LOCK",
        }
    }
}

impl fmt::Display for LockoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LockoutReason {
    type Err = acctguard_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAILED_ATTEMPTS" => Ok(Self::FailedAttempts),
            "ADMIN_LOCK" => Ok(Self::AdminLock),
            _ => Err(acctguard_core::AppError::validation(format!(
                "Invalid lockout reason: '{s}'. Expected one of: FAILED_ATTEMPTS, ADMIN_LOCK"
            ))),
        }
    }
}

/// Persisted lockout type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockoutType {
    /// Time-boxed lock that expires on its own.
    Standard,
    /// Lock with no expiry; only an administrator can clear it.
    Security,
}

impl LockoutType {
    /// Return the type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Security => "SECURITY",
        }
    }
}

impl fmt::Display for LockoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LockoutType {
    type Err = acctguard_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD" => Ok(Self::Standard),
            "SECURITY" => Ok(Self::Security),
            _ => Err(acctguard_core::AppError::validation(format!(
                "Invalid lockout type: '{s}'. Expected one of: STANDARD, SECURITY"
            ))),
        }
    }
}

/// The lock state of an account, derived from the persisted nullable columns.
///
/// Precedence when reading a record is manual, then security, then
/// time-boxed. A `Standard` lock whose `until` has passed is still reported
/// here; use [`LockState::is_locked_at`] to decide whether it blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockState {
    /// No lock recorded.
    Unlocked,
    /// Time-boxed lock after repeated failures.
    Standard {
        /// When the lock lapses.
        until: DateTime<Utc>,
    },
    /// Failure-triggered lock that requires an administrator.
    Security,
    /// Administrator-initiated lock.
    Manual {
        /// The administrator who locked the account.
        by: Option<Uuid>,
        /// When the lock was applied.
        at: Option<DateTime<Utc>>,
        /// Free-form notes recorded with the lock.
        notes: Option<String>,
    },
}

impl LockState {
    /// Whether this state blocks a login at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Unlocked => false,
            Self::Standard { until } => *until > now,
            Self::Security | Self::Manual { .. } => true,
        }
    }

    /// The persisted lockout type for this state.
    pub fn lockout_type(&self) -> Option<LockoutType> {
        match self {
            Self::Unlocked => None,
            Self::Standard { .. } => Some(LockoutType::Standard),
            Self::Security | Self::Manual { .. } => Some(LockoutType::Security),
        }
    }
}
