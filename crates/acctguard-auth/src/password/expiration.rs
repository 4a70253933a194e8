//! Password expiration, grace period, and warning escalation.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use acctguard_core::config::PasswordPolicyConfig;
use acctguard_core::result::AppResult;
use acctguard_core::traits::Clock;
use acctguard_entity::user::{UserAuthRecord, UserPatch};
use acctguard_store::traits::UserStore;

const MS_PER_DAY: i64 = 86_400_000;

/// Highest warning level; the password has expired.
pub const WARNING_LEVEL_EXPIRED: u8 = 5;

/// Expiration snapshot for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationStatus {
    /// Login must be refused for password age.
    pub is_expired: bool,
    /// The grace window is running.
    pub is_in_grace_period: bool,
    /// Whole days (rounded up) until expiry; `None` without an expiry date.
    pub days_until_expiration: Option<i64>,
    /// Whole days (rounded up, floored at 0) left in the grace window;
    /// `None` when no grace period has started.
    pub grace_period_days_remaining: Option<i64>,
    /// Escalating urgency, 0-5.
    pub warning_level: u8,
    /// Length of the user's expiration window in days.
    pub expiration_period_days: u64,
}

/// Computes expiration dates and statuses, and resets them on password change.
#[derive(Clone)]
pub struct PasswordExpirationPolicy {
    /// User record persistence, used by the mutating operations.
    users: Arc<dyn UserStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Window lengths.
    config: PasswordPolicyConfig,
}

impl std::fmt::Debug for PasswordExpirationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordExpirationPolicy")
            .field("config", &self.config)
            .finish()
    }
}

impl PasswordExpirationPolicy {
    /// Creates the policy.
    pub fn new(
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        config: PasswordPolicyConfig,
    ) -> Self {
        Self {
            users,
            clock,
            config,
        }
    }

    /// Expiration window for `role`.
    ///
    /// Only an exact, case-sensitive match on the configured admin role gets
    /// the short window; "admin" and "ADMIN" are treated as ordinary roles.
    pub fn expiration_window_days(&self, role: &str) -> u64 {
        if role == self.config.admin_role {
            self.config.admin_expiration_days
        } else {
            self.config.default_expiration_days
        }
    }

    /// `start` plus the role's window in calendar days.
    pub fn expiration_date(&self, start: DateTime<Utc>, role: &str) -> DateTime<Utc> {
        let days = self.expiration_window_days(role);
        start
            .checked_add_days(Days::new(days))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Current expiration status of `user`.
    pub fn status(&self, user: &UserAuthRecord) -> ExpirationStatus {
        let now = self.clock.now();
        let days_until_expiration = user
            .password_expires_at
            .map(|at| ceil_days((at - now).num_milliseconds()));
        let warning_level = days_until_expiration.map(warning_level).unwrap_or(0);

        let grace_end = user
            .grace_period_started_at
            .map(|start| (start, self.grace_period_end(start)));

        let (is_expired, is_in_grace_period, grace_period_days_remaining) = match grace_end {
            Some((start, end)) => (
                now > end,
                start <= now && now <= end,
                Some(ceil_days((end - now).num_milliseconds()).max(0)),
            ),
            None => (
                user.password_expires_at.is_some_and(|at| now > at),
                false,
                None,
            ),
        };

        ExpirationStatus {
            is_expired,
            is_in_grace_period,
            days_until_expiration,
            grace_period_days_remaining,
            warning_level,
            expiration_period_days: self.expiration_window_days(&user.role),
        }
    }

    /// End of a grace period started at `start`, saturating like
    /// [`Self::expiration_date`]. A non-positive length ends it at `start`.
    pub fn grace_period_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.config.grace_period_days.max(0))
            .and_then(|d| start.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the raw expiry has passed and no grace period was started.
    pub fn needs_grace_period(&self, user: &UserAuthRecord) -> bool {
        user.grace_period_started_at.is_none()
            && user
                .password_expires_at
                .is_some_and(|at| self.clock.now() > at)
    }

    /// Starts a new expiration cycle after a password change.
    ///
    /// Returns the new expiry.
    pub async fn reset(&self, user_id: Uuid, role: &str) -> AppResult<DateTime<Utc>> {
        let now = self.clock.now();
        let expires_at = self.expiration_date(now, role);
        let patch = UserPatch {
            password_expires_at: Some(Some(expires_at)),
            last_expiration_warning_level: Some(0),
            grace_period_started_at: Some(None),
            last_password_change: Some(Some(now)),
            ..UserPatch::default()
        };
        self.users.update_fields(user_id, &patch).await?;
        info!(user_id = %user_id, expires_at = %expires_at, "Password expiration reset");
        Ok(expires_at)
    }

    /// Marks the grace period as started now.
    pub async fn start_grace_period(&self, user_id: Uuid) -> AppResult<UserAuthRecord> {
        let patch = UserPatch {
            grace_period_started_at: Some(Some(self.clock.now())),
            ..UserPatch::default()
        };
        let updated = self.users.update_fields(user_id, &patch).await?;
        info!(user_id = %user_id, "Password grace period started");
        Ok(updated)
    }

    /// Persists the warning level that was just delivered.
    pub async fn record_warning_level(&self, user_id: Uuid, level: u8) -> AppResult<()> {
        let patch = UserPatch {
            last_expiration_warning_level: Some(level.min(WARNING_LEVEL_EXPIRED)),
            ..UserPatch::default()
        };
        self.users.update_fields(user_id, &patch).await?;
        Ok(())
    }
}

/// Warning level for a days-until-expiration value, most urgent first.
pub fn warning_level(days_until_expiration: i64) -> u8 {
    match days_until_expiration {
        d if d <= 0 => WARNING_LEVEL_EXPIRED,
        d if d <= 1 => 4,
        d if d <= 3 => 3,
        d if d <= 7 => 2,
        d if d <= 14 => 1,
        _ => 0,
    }
}

/// Whether `current` is a strict escalation over the last delivered level.
pub fn should_warn(current: u8, last: Option<u8>) -> bool {
    current > 0 && current > last.unwrap_or(0)
}

/// Ceiling division of a signed millisecond span into days.
fn ceil_days(ms: i64) -> i64 {
    let days = ms / MS_PER_DAY;
    if ms % MS_PER_DAY > 0 { days + 1 } else { days }
}
