//! Failed-login lockout state machine.
//!
//! States and transitions:
//!
//! - `Unlocked` → `Standard` when the failure count reaches the threshold
//! - `Standard` → `Security` when failures continue past the security
//!   threshold (an upgrade, audited separately)
//! - any → `Manual` on an administrator lock
//! - any → `Unlocked` on an administrator unlock, and `Standard` →
//!   `Unlocked` once its window lapses and the sweep runs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use acctguard_core::config::LockoutConfig;
use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_core::traits::Clock;
use acctguard_entity::audit::{AuditEvent, AuditEventType, AuditSeverity, RequestContext};
use acctguard_entity::user::{
    LockState, LockoutReason, LockoutType, UserAuthRecord, UserFilter, UserPatch,
};
use acctguard_store::traits::UserStore;

use crate::audit::AuditRecorder;

const MS_PER_MINUTE: i64 = 60_000;

/// Result of recording one failed login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureOutcome {
    /// Whether this failure locked the account.
    pub locked: bool,
    /// Kind of lock applied, if any.
    pub lockout_type: Option<LockoutType>,
    /// End of a standard lock.
    pub locked_until: Option<DateTime<Utc>>,
    /// Failure count after this attempt.
    pub failed_attempts: u32,
    /// Failures left before a lock; 0 once locked.
    pub remaining_attempts: u32,
}

/// Lockout snapshot for display and login decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutStatus {
    /// The decoded lock state.
    pub state: LockState,
    /// Whether a login would be refused now.
    pub locked: bool,
    /// Minutes until a standard lock lapses; 0 otherwise.
    pub remaining_minutes: i64,
    /// Current failure count.
    pub failed_attempts: u32,
    /// Failures left before a lock.
    pub remaining_attempts: u32,
}

/// Tracks failed attempts and lock state per user.
#[derive(Clone)]
pub struct LockoutStateMachine {
    /// User record persistence.
    users: Arc<dyn UserStore>,
    /// Audit delivery.
    audit: AuditRecorder,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Thresholds.
    config: LockoutConfig,
}

impl std::fmt::Debug for LockoutStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockoutStateMachine")
            .field("config", &self.config)
            .finish()
    }
}

impl LockoutStateMachine {
    /// Creates a lockout state machine.
    pub fn new(
        users: Arc<dyn UserStore>,
        audit: AuditRecorder,
        clock: Arc<dyn Clock>,
        config: LockoutConfig,
    ) -> Self {
        Self {
            users,
            audit,
            clock,
            config,
        }
    }

    /// Records a failed login and locks the account once the threshold is hit.
    ///
    /// Counts above the security threshold produce a security lock with no
    /// expiry; otherwise the lock is standard and lapses after the configured
    /// duration. On a manually locked account the attempt is counted but the
    /// lock columns are left as the administrator set them. Store failures
    /// and a missing user are returned to the caller.
    pub async fn record_failure(
        &self,
        user_id: Uuid,
        ctx: &RequestContext,
    ) -> AppResult<FailureOutcome> {
        let user = self.load(user_id).await?;
        let attempts = user.failed_login_attempts.saturating_add(1);
        let max = self.config.max_failed_attempts;

        let current = user.lock_state();
        if matches!(current, LockState::Manual { .. }) {
            self.users
                .update_fields(user_id, &UserPatch::new().failed_attempts(attempts))
                .await?;
            debug!(
                user_id = %user_id,
                attempts,
                "Failed login recorded on manually locked account"
            );
            return Ok(FailureOutcome {
                locked: true,
                lockout_type: current.lockout_type(),
                locked_until: None,
                failed_attempts: attempts,
                remaining_attempts: 0,
            });
        }

        if attempts < max {
            self.users
                .update_fields(user_id, &UserPatch::new().failed_attempts(attempts))
                .await?;
            debug!(user_id = %user_id, attempts, "Failed login recorded");
            return Ok(FailureOutcome {
                locked: false,
                lockout_type: None,
                locked_until: None,
                failed_attempts: attempts,
                remaining_attempts: max - attempts,
            });
        }

        let now = self.clock.now();
        let next = if attempts > self.config.security_threshold {
            LockState::Security
        } else {
            LockState::Standard {
                until: self.standard_lock_end(now)?,
            }
        };
        let prior_type = user.login_lockout_type;

        let patch = UserPatch::new()
            .failed_attempts(attempts)
            .lock_state(&next, Some(LockoutReason::FailedAttempts))
            .active(false);
        let updated = self.users.update_fields(user_id, &patch).await?;

        let (event_type, severity) = match (&next, prior_type) {
            (LockState::Security, Some(LockoutType::Standard)) => {
                (AuditEventType::AccountLockoutUpgraded, AuditSeverity::Critical)
            }
            (LockState::Security, _) => {
                (AuditEventType::AccountSecurityLocked, AuditSeverity::Critical)
            }
            _ => (AuditEventType::AccountLocked, AuditSeverity::Warning),
        };
        let lockout_type = next.lockout_type();
        let locked_until = updated.login_locked_until;

        warn!(
            user_id = %user_id,
            username = %user.username,
            attempts,
            lockout_type = ?lockout_type,
            locked_until = ?locked_until,
            event = %event_type,
            "User account locked due to failed login attempts"
        );

        self.audit
            .record(
                AuditEvent::new(event_type, severity, now)
                    .actor(&user)
                    .request(ctx)
                    .blocked("Too many failed login attempts")
                    .extra("failed_attempts", attempts)
                    .extra("lockout_type", lockout_type.map(|t| t.as_str()))
                    .extra("previous_lockout_type", prior_type.map(|t| t.as_str()))
                    .extra("locked_until", locked_until.map(|t| t.to_rfc3339())),
            )
            .await;

        Ok(FailureOutcome {
            locked: true,
            lockout_type,
            locked_until,
            failed_attempts: attempts,
            remaining_attempts: 0,
        })
    }

    /// Resets the failure counter and clears the failure-lock columns.
    pub async fn record_success(&self, user_id: Uuid) -> AppResult<()> {
        let patch = UserPatch {
            failed_login_attempts: Some(0),
            login_locked_until: Some(None),
            login_lockout_reason: Some(None),
            login_lockout_type: Some(None),
            ..UserPatch::default()
        };
        self.users.update_fields(user_id, &patch).await?;
        debug!(user_id = %user_id, "Failed login counter reset");
        Ok(())
    }

    /// Whether the account refuses logins right now.
    ///
    /// Manual locks win, then security locks, then an unexpired standard
    /// window. A lapsed standard lock reads as unlocked even before the
    /// sweep clears its columns.
    pub fn is_locked(&self, user: &UserAuthRecord) -> bool {
        user.lock_state().is_locked_at(self.clock.now())
    }

    /// Whole minutes (rounded up) until `locked_until`, floored at zero.
    pub fn remaining_lockout_minutes(&self, locked_until: Option<DateTime<Utc>>) -> i64 {
        let Some(until) = locked_until else {
            return 0;
        };
        let ms = (until - self.clock.now()).num_milliseconds();
        if ms <= 0 {
            return 0;
        }
        (ms + MS_PER_MINUTE - 1) / MS_PER_MINUTE
    }

    /// Lockout snapshot for a loaded record.
    pub fn status(&self, user: &UserAuthRecord) -> LockoutStatus {
        let state = user.lock_state();
        let locked = state.is_locked_at(self.clock.now());
        let remaining_minutes = match &state {
            LockState::Standard { until } => self.remaining_lockout_minutes(Some(*until)),
            _ => 0,
        };
        LockoutStatus {
            state,
            locked,
            remaining_minutes,
            failed_attempts: user.failed_login_attempts,
            remaining_attempts: self
                .config
                .max_failed_attempts
                .saturating_sub(user.failed_login_attempts),
        }
    }

    /// Applies an administrator lock that supersedes every other state.
    pub async fn lock_manually(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        reason: &str,
        notes: Option<&str>,
    ) -> AppResult<UserAuthRecord> {
        let user = self.load(user_id).await?;
        let now = self.clock.now();
        let state = LockState::Manual {
            by: Some(admin_id),
            at: Some(now),
            notes: Some(notes.unwrap_or(reason).to_string()),
        };
        let patch = UserPatch::new()
            .lock_state(&state, Some(LockoutReason::AdminLock))
            .active(false);
        let updated = self.users.update_fields(user_id, &patch).await?;

        info!(
            user_id = %user_id,
            admin_id = %admin_id,
            reason = %reason,
            "User account manually locked"
        );

        self.audit
            .record(
                AuditEvent::new(
                    AuditEventType::AccountManuallyLocked,
                    AuditSeverity::Warning,
                    now,
                )
                .actor_id(admin_id)
                .authenticated()
                .extra("target_user_id", user.id.to_string())
                .extra("target_username", user.username.clone())
                .extra("reason", reason),
            )
            .await;

        Ok(updated)
    }

    /// Clears every lock column, resets the counter and reactivates the account.
    pub async fn unlock(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        verification_notes: &str,
    ) -> AppResult<UserAuthRecord> {
        let user = self.load(user_id).await?;
        let prior_state = user.lock_state();
        let updated = self
            .users
            .update_fields(user_id, &UserPatch::clear_lock())
            .await?;

        info!(
            user_id = %user_id,
            admin_id = %admin_id,
            prior_reason = ?user.login_lockout_reason,
            prior_attempts = user.failed_login_attempts,
            "User account unlocked"
        );

        self.audit
            .record(
                AuditEvent::new(
                    AuditEventType::AccountUnlocked,
                    AuditSeverity::Info,
                    self.clock.now(),
                )
                .actor_id(admin_id)
                .authenticated()
                .extra("target_user_id", user.id.to_string())
                .extra("target_username", user.username.clone())
                .extra(
                    "previous_lockout_reason",
                    user.login_lockout_reason.map(|r| r.as_str()),
                )
                .extra(
                    "previous_lockout_type",
                    prior_state.lockout_type().map(|t| t.as_str()),
                )
                .extra("previous_failed_attempts", user.failed_login_attempts)
                .extra("verification_notes", verification_notes),
            )
            .await;

        Ok(updated)
    }

    /// Releases every standard lock that lapsed before `now`.
    ///
    /// A single predicate update evaluated by the store, so redundant and
    /// concurrent runs cannot resurrect or double-release a row.
    pub async fn auto_unlock_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let released = self
            .users
            .batch_update_where(
                &UserFilter::lapsed_standard_locks(now),
                &UserPatch::clear_lock(),
            )
            .await?;

        if released > 0 {
            info!(count = released, "Released lapsed standard lockouts");
            self.audit
                .record(
                    AuditEvent::new(
                        AuditEventType::AccountsAutoUnlocked,
                        AuditSeverity::Info,
                        now,
                    )
                    .extra("count", released),
                )
                .await;
        }

        Ok(released)
    }

    /// Releases one user's lapsed standard lock, if any.
    ///
    /// The login-path twin of [`Self::auto_unlock_expired`].
    pub async fn release_expired(&self, user_id: Uuid) -> AppResult<bool> {
        let filter = UserFilter::lapsed_standard_locks(self.clock.now()).for_user(user_id);
        let released = self
            .users
            .batch_update_where(&filter, &UserPatch::clear_lock())
            .await?;
        if released > 0 {
            debug!(user_id = %user_id, "Released lapsed standard lockout on login");
        }
        Ok(released > 0)
    }

    fn standard_lock_end(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let minutes = self.config.lockout_duration_minutes;
        Duration::try_minutes(minutes)
            .filter(|d| *d > Duration::zero())
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "lockout_duration_minutes out of range: {minutes}"
                ))
            })
    }

    async fn load(&self, user_id: Uuid) -> AppResult<UserAuthRecord> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}
