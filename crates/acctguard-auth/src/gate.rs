//! Credential gate: the login-path orchestrator called by the HTTP layer.
//!
//! Password verification happens outside; the gate is told whether the
//! credentials matched and decides what the attempt means for the account.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_core::traits::Clock;
use acctguard_entity::audit::{AuditEvent, AuditEventType, AuditSeverity, RequestContext};
use acctguard_entity::session::Session;
use acctguard_entity::user::UserAuthRecord;
use acctguard_store::traits::UserStore;

use crate::audit::AuditRecorder;
use crate::lockout::{FailureOutcome, LockoutStateMachine, LockoutStatus};
use crate::password::{ExpirationStatus, PasswordExpirationPolicy, should_warn};
use crate::session::{SessionRegistry, ValidatedSession};

/// What a failed credential check did to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FailureResult {
    /// The account was already locked; the attempt was not counted.
    Blocked {
        /// Lock snapshot to show the user.
        status: LockoutStatus,
    },
    /// The failure was counted.
    Recorded(FailureOutcome),
}

/// Result of a login whose credentials matched.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// A session was issued.
    Granted {
        /// The new session.
        session: Session,
        /// Password expiration state at login.
        expiration: ExpirationStatus,
        /// Whether to show an expiration warning on this login.
        warn: bool,
    },
    /// The account is locked.
    Locked {
        /// Lock snapshot to show the user.
        status: LockoutStatus,
    },
    /// The password and its grace period have both expired.
    PasswordExpired {
        /// Password expiration state at login.
        expiration: ExpirationStatus,
    },
}

impl LoginOutcome {
    /// Whether a session was issued.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Ties lockout, password expiration and sessions together per login attempt.
#[derive(Clone)]
pub struct CredentialGate {
    users: Arc<dyn UserStore>,
    lockout: Arc<LockoutStateMachine>,
    policy: Arc<PasswordExpirationPolicy>,
    sessions: Arc<SessionRegistry>,
    audit: AuditRecorder,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGate").finish()
    }
}

impl CredentialGate {
    /// Creates the gate.
    pub fn new(
        users: Arc<dyn UserStore>,
        lockout: Arc<LockoutStateMachine>,
        policy: Arc<PasswordExpirationPolicy>,
        sessions: Arc<SessionRegistry>,
        audit: AuditRecorder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            lockout,
            policy,
            sessions,
            audit,
            clock,
        }
    }

    /// Handles a login whose password did not match.
    ///
    /// A locked account is refused without touching the counter.
    pub async fn check_and_record_failure(
        &self,
        user_id: Uuid,
        ctx: &RequestContext,
    ) -> AppResult<FailureResult> {
        let user = self.load(user_id).await?;
        if self.lockout.is_locked(&user) {
            let status = self.blocked(&user, ctx).await;
            return Ok(FailureResult::Blocked { status });
        }

        let outcome = self.lockout.record_failure(user_id, ctx).await?;
        Ok(FailureResult::Recorded(outcome))
    }

    /// Handles a login whose password matched.
    pub async fn record_success_and_issue_session(
        &self,
        user_id: Uuid,
        ctx: &RequestContext,
    ) -> AppResult<LoginOutcome> {
        let mut user = self.load(user_id).await?;
        if self.lockout.is_locked(&user) {
            let status = self.blocked(&user, ctx).await;
            return Ok(LoginOutcome::Locked { status });
        }

        self.lockout.release_expired(user_id).await?;

        if self.policy.needs_grace_period(&user) {
            user = self.policy.start_grace_period(user_id).await?;
            warn!(user_id = %user_id, "Password expired, grace period started");
            self.audit
                .record(
                    AuditEvent::new(
                        AuditEventType::GracePeriodStarted,
                        AuditSeverity::Warning,
                        self.clock.now(),
                    )
                    .actor(&user)
                    .request(ctx)
                    .extra("password_expires_at", user.password_expires_at.map(|t| t.to_rfc3339())),
                )
                .await;
        }

        let expiration = self.policy.status(&user);
        if expiration.is_expired {
            warn!(user_id = %user_id, "Login denied, password expired");
            self.audit
                .record(
                    AuditEvent::new(
                        AuditEventType::PasswordExpiredLoginDenied,
                        AuditSeverity::Warning,
                        self.clock.now(),
                    )
                    .actor(&user)
                    .request(ctx)
                    .blocked("Password expired")
                    .extra("password_expires_at", user.password_expires_at.map(|t| t.to_rfc3339())),
                )
                .await;
            return Ok(LoginOutcome::PasswordExpired { expiration });
        }

        let warn = should_warn(
            expiration.warning_level,
            Some(user.last_expiration_warning_level),
        );

        let created = self.sessions.create(user_id, ctx, false).await?;
        let warning_level = warn.then_some(expiration.warning_level);
        if let Err(e) = self.persist_login(user_id, warning_level).await {
            error!(
                user_id = %user_id,
                error = %e,
                "Failed to persist login, revoking session"
            );
            self.sessions.terminate(&created.session.session_token).await;
            return Err(e);
        }

        let now = self.clock.now();
        for evicted in &created.evicted {
            self.audit
                .record(
                    AuditEvent::new(AuditEventType::SessionEvicted, AuditSeverity::Info, now)
                        .actor(&user)
                        .request(ctx)
                        .extra("session_id", evicted.id.to_string())
                        .extra("created_at", evicted.created_at.to_rfc3339()),
                )
                .await;
        }
        self.audit
            .record(
                AuditEvent::new(AuditEventType::SessionCreated, AuditSeverity::Info, now)
                    .actor(&user)
                    .request(ctx)
                    .authenticated()
                    .extra("session_id", created.session.id.to_string())
                    .extra("device_info", created.session.device_info.clone()),
            )
            .await;

        info!(
            user_id = %user_id,
            session_id = %created.session.id,
            warning_level = expiration.warning_level,
            "Login granted"
        );

        Ok(LoginOutcome::Granted {
            session: created.session,
            expiration,
            warn,
        })
    }

    /// Lockout snapshot of one user.
    pub async fn lockout_status(&self, user_id: Uuid) -> AppResult<LockoutStatus> {
        let user = self.load(user_id).await?;
        Ok(self.lockout.status(&user))
    }

    /// Password expiration snapshot of one user.
    pub async fn expiration_status(&self, user_id: Uuid) -> AppResult<ExpirationStatus> {
        let user = self.load(user_id).await?;
        Ok(self.policy.status(&user))
    }

    /// Non-expired sessions of one user, newest first.
    pub async fn list_active_sessions(&self, user_id: Uuid) -> Vec<Session> {
        self.sessions.list_active(user_id).await
    }

    /// Locks the account for an administrator and signs it out everywhere.
    pub async fn lock_manually(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        reason: &str,
        notes: Option<&str>,
    ) -> AppResult<UserAuthRecord> {
        let updated = self
            .lockout
            .lock_manually(user_id, admin_id, reason, notes)
            .await?;
        self.sessions.terminate_all(user_id).await;
        Ok(updated)
    }

    /// Clears every lock on the account.
    pub async fn unlock(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        verification_notes: &str,
    ) -> AppResult<UserAuthRecord> {
        self.lockout.unlock(user_id, admin_id, verification_notes).await
    }

    /// Starts a new expiration cycle after the user changed their password.
    pub async fn password_changed(&self, user_id: Uuid) -> AppResult<DateTime<Utc>> {
        let user = self.load(user_id).await?;
        self.policy.reset(user_id, &user.role).await
    }

    /// Resolves a bearer token to a live session.
    pub async fn authenticate(&self, token: &str) -> Option<ValidatedSession> {
        self.sessions.validate(token).await
    }

    /// Ends the session holding `token`.
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.terminate(token).await
    }

    /// Resets the failure counter and stores the warning level shown, if any.
    async fn persist_login(&self, user_id: Uuid, warning_level: Option<u8>) -> AppResult<()> {
        self.lockout.record_success(user_id).await?;
        if let Some(level) = warning_level {
            self.policy.record_warning_level(user_id, level).await?;
        }
        Ok(())
    }

    /// Audits a refused login and returns the lock snapshot.
    async fn blocked(&self, user: &UserAuthRecord, ctx: &RequestContext) -> LockoutStatus {
        let status = self.lockout.status(user);
        warn!(
            user_id = %user.id,
            state = ?status.state,
            remaining_minutes = status.remaining_minutes,
            "Login blocked, account locked"
        );
        self.audit
            .record(
                AuditEvent::new(
                    AuditEventType::LoginBlocked,
                    AuditSeverity::Warning,
                    self.clock.now(),
                )
                .actor(user)
                .request(ctx)
                .blocked("Account locked")
                .extra(
                    "lockout_type",
                    status.state.lockout_type().map(|t| t.as_str()),
                )
                .extra("remaining_minutes", status.remaining_minutes),
            )
            .await;
        status
    }

    async fn load(&self, user_id: Uuid) -> AppResult<UserAuthRecord> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}
