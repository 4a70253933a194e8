//! User auth record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lockout::{LockState, LockoutReason, LockoutType};

/// The authentication-relevant slice of a user account.
///
/// Owned by the user store. This core mutates it on login attempts,
/// administrator lock/unlock actions, and password changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAuthRecord {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Role name, as stored (case preserved).
    pub role: String,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: u32,
    /// End of a standard lock.
    pub login_locked_until: Option<DateTime<Utc>>,
    /// Why the account is locked.
    pub login_lockout_reason: Option<LockoutReason>,
    /// Kind of lock currently recorded.
    pub login_lockout_type: Option<LockoutType>,
    /// Set by an administrator lock.
    pub is_manually_locked: bool,
    /// The administrator who applied a manual lock.
    pub locked_by: Option<Uuid>,
    /// When a manual lock was applied.
    pub locked_at: Option<DateTime<Utc>>,
    /// Notes attached to a manual lock.
    pub lockout_notes: Option<String>,
    /// Whether the account may be used.
    pub active: bool,
    /// When the current password expires.
    pub password_expires_at: Option<DateTime<Utc>>,
    /// Highest expiration warning already delivered this cycle (0-5).
    pub last_expiration_warning_level: u8,
    /// When the post-expiration grace period began.
    pub grace_period_started_at: Option<DateTime<Utc>>,
    /// When the password was last changed.
    pub last_password_change: Option<DateTime<Utc>>,
}

impl UserAuthRecord {
    /// A freshly created account with zeroed lock and expiration fields.
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            role: role.into(),
            failed_login_attempts: 0,
            login_locked_until: None,
            login_lockout_reason: None,
            login_lockout_type: None,
            is_manually_locked: false,
            locked_by: None,
            locked_at: None,
            lockout_notes: None,
            active: true,
            password_expires_at: None,
            last_expiration_warning_level: 0,
            grace_period_started_at: None,
            last_password_change: None,
        }
    }

    /// Reads the nullable lock columns into a [`LockState`].
    pub fn lock_state(&self) -> LockState {
        if self.is_manually_locked {
            return LockState::Manual {
                by: self.locked_by,
                at: self.locked_at,
                notes: self.lockout_notes.clone(),
            };
        }
        if self.login_lockout_type == Some(LockoutType::Security) {
            return LockState::Security;
        }
        match self.login_locked_until {
            Some(until) => LockState::Standard { until },
            None => LockState::Unlocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_record_is_unlocked() {
        let user = UserAuthRecord::new("jdoe", "HRO");
        assert!(user.active);
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.lock_state(), LockState::Unlocked);
    }

    #[test]
    fn test_manual_flag_wins_over_other_columns() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.login_locked_until = Some(Utc::now() + Duration::minutes(10));
        user.login_lockout_type = Some(LockoutType::Standard);
        user.is_manually_locked = true;
        assert!(matches!(user.lock_state(), LockState::Manual { .. }));
    }

    #[test]
    fn test_security_type_wins_over_until() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.login_locked_until = Some(Utc::now() - Duration::minutes(10));
        user.login_lockout_type = Some(LockoutType::Security);
        assert_eq!(user.lock_state(), LockState::Security);
    }

    #[test]
    fn test_stale_standard_type_without_until_reads_unlocked() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.login_lockout_type = Some(LockoutType::Standard);
        assert_eq!(user.lock_state(), LockState::Unlocked);
    }
}
