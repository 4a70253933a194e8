//! Partial updates and row predicates over [`UserAuthRecord`].
//!
//! These are the shapes the user store receives: a `UserPatch` names only
//! the columns to write (an outer `None` leaves a column untouched, an inner
//! `None` writes NULL), and a `UserFilter` is evaluated by the store itself
//! so batch updates never race a previously fetched snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lockout::{LockState, LockoutReason, LockoutType};
use super::model::UserAuthRecord;

/// Columns to overwrite on a user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub failed_login_attempts: Option<u32>,
    pub login_locked_until: Option<Option<DateTime<Utc>>>,
    pub login_lockout_reason: Option<Option<LockoutReason>>,
    pub login_lockout_type: Option<Option<LockoutType>>,
    pub is_manually_locked: Option<bool>,
    pub locked_by: Option<Option<Uuid>>,
    pub locked_at: Option<Option<DateTime<Utc>>>,
    pub lockout_notes: Option<Option<String>>,
    pub active: Option<bool>,
    pub password_expires_at: Option<Option<DateTime<Utc>>>,
    pub last_expiration_warning_level: Option<u8>,
    pub grace_period_started_at: Option<Option<DateTime<Utc>>>,
    pub last_password_change: Option<Option<DateTime<Utc>>>,
}

impl UserPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every lock column, zeroes the attempt counter and reactivates.
    pub fn clear_lock() -> Self {
        Self::new()
            .failed_attempts(0)
            .lock_state(&LockState::Unlocked, None)
            .active(true)
    }

    /// Sets the failed-attempt counter.
    pub fn failed_attempts(mut self, count: u32) -> Self {
        self.failed_login_attempts = Some(count);
        self
    }

    /// Sets the active flag.
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Lowers a [`LockState`] into the nullable lock columns.
    ///
    /// `Standard` and `Security` leave the manual-lock columns alone;
    /// `Unlocked` and `Manual` write all of them.
    pub fn lock_state(mut self, state: &LockState, reason: Option<LockoutReason>) -> Self {
        self.login_lockout_reason = Some(reason);
        self.login_lockout_type = Some(state.lockout_type());
        match state {
            LockState::Unlocked => {
                self.login_locked_until = Some(None);
                self.is_manually_locked = Some(false);
                self.locked_by = Some(None);
                self.locked_at = Some(None);
                self.lockout_notes = Some(None);
            }
            LockState::Standard { until } => {
                self.login_locked_until = Some(Some(*until));
            }
            LockState::Security => {
                self.login_locked_until = Some(None);
            }
            LockState::Manual { by, at, notes } => {
                self.login_locked_until = Some(None);
                self.is_manually_locked = Some(true);
                self.locked_by = Some(*by);
                self.locked_at = Some(*at);
                self.lockout_notes = Some(notes.clone());
            }
        }
        self
    }

    /// Writes the patched columns into `user`.
    pub fn apply(&self, user: &mut UserAuthRecord) {
        if let Some(v) = self.failed_login_attempts {
            user.failed_login_attempts = v;
        }
        if let Some(v) = self.login_locked_until {
            user.login_locked_until = v;
        }
        if let Some(v) = self.login_lockout_reason {
            user.login_lockout_reason = v;
        }
        if let Some(v) = self.login_lockout_type {
            user.login_lockout_type = v;
        }
        if let Some(v) = self.is_manually_locked {
            user.is_manually_locked = v;
        }
        if let Some(v) = self.locked_by {
            user.locked_by = v;
        }
        if let Some(v) = self.locked_at {
            user.locked_at = v;
        }
        if let Some(v) = &self.lockout_notes {
            user.lockout_notes = v.clone();
        }
        if let Some(v) = self.active {
            user.active = v;
        }
        if let Some(v) = self.password_expires_at {
            user.password_expires_at = v;
        }
        if let Some(v) = self.last_expiration_warning_level {
            user.last_expiration_warning_level = v;
        }
        if let Some(v) = self.grace_period_started_at {
            user.grace_period_started_at = v;
        }
        if let Some(v) = self.last_password_change {
            user.last_password_change = v;
        }
    }
}

/// Row predicate for batch updates. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Restrict to one user.
    pub id: Option<Uuid>,
    /// Required value of `active`.
    pub active: Option<bool>,
    /// Required value of `is_manually_locked`.
    pub is_manually_locked: Option<bool>,
    /// Required (non-null) value of `login_lockout_type`.
    pub lockout_type: Option<LockoutType>,
    /// `login_locked_until` must be set and strictly before this instant.
    pub locked_until_before: Option<DateTime<Utc>>,
}

impl UserFilter {
    /// Standard locks that lapsed before `now` and have not been released.
    pub fn lapsed_standard_locks(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            active: Some(false),
            is_manually_locked: Some(false),
            lockout_type: Some(LockoutType::Standard),
            locked_until_before: Some(now),
        }
    }

    /// Narrows the filter to a single user.
    pub fn for_user(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Evaluates the predicate against a record.
    pub fn matches(&self, user: &UserAuthRecord) -> bool {
        if self.id.is_some_and(|id| id != user.id) {
            return false;
        }
        if self.active.is_some_and(|a| a != user.active) {
            return false;
        }
        if self
            .is_manually_locked
            .is_some_and(|m| m != user.is_manually_locked)
        {
            return false;
        }
        if let Some(t) = self.lockout_type {
            if user.login_lockout_type != Some(t) {
                return false;
            }
        }
        if let Some(before) = self.locked_until_before {
            match user.login_locked_until {
                Some(until) if until < before => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_clear_lock_resets_everything() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.failed_login_attempts = 7;
        user.is_manually_locked = true;
        user.locked_by = Some(Uuid::new_v4());
        user.lockout_notes = Some("fraud".into());
        user.login_lockout_type = Some(LockoutType::Security);
        user.active = false;

        UserPatch::clear_lock().apply(&mut user);

        assert_eq!(user.failed_login_attempts, 0);
        assert!(!user.is_manually_locked);
        assert!(user.locked_by.is_none());
        assert!(user.lockout_notes.is_none());
        assert!(user.login_lockout_type.is_none());
        assert!(user.active);
        assert_eq!(user.lock_state(), LockState::Unlocked);
    }

    #[test]
    fn test_standard_patch_keeps_manual_columns() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.lockout_notes = Some("earlier note".into());
        let until = Utc::now() + Duration::minutes(30);

        UserPatch::new()
            .lock_state(&LockState::Standard { until }, Some(LockoutReason::FailedAttempts))
            .apply(&mut user);

        assert_eq!(user.login_locked_until, Some(until));
        assert_eq!(user.login_lockout_type, Some(LockoutType::Standard));
        assert_eq!(user.lockout_notes.as_deref(), Some("earlier note"));
    }

    #[test]
    fn test_security_patch_nulls_until() {
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.login_locked_until = Some(Utc::now());
        UserPatch::new()
            .lock_state(&LockState::Security, Some(LockoutReason::FailedAttempts))
            .apply(&mut user);
        assert!(user.login_locked_until.is_none());
        assert_eq!(user.lock_state(), LockState::Security);
    }

    #[test]
    fn test_lapsed_filter() {
        let now = Utc::now();
        let mut user = UserAuthRecord::new("jdoe", "HRO");
        user.active = false;
        user.login_lockout_type = Some(LockoutType::Standard);
        user.login_locked_until = Some(now - Duration::minutes(1));

        let filter = UserFilter::lapsed_standard_locks(now);
        assert!(filter.matches(&user));

        user.login_locked_until = Some(now);
        assert!(!filter.matches(&user), "boundary is strict");

        user.login_locked_until = Some(now - Duration::minutes(1));
        user.is_manually_locked = true;
        assert!(!filter.matches(&user));

        user.is_manually_locked = false;
        assert!(!filter.clone().for_user(Uuid::new_v4()).matches(&user));
        assert!(filter.for_user(user.id).matches(&user));
    }
}
