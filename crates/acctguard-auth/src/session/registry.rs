//! Session registry: issue, validate, evict, and sweep sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use acctguard_core::config::SessionConfig;
use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_core::traits::Clock;
use acctguard_entity::audit::RequestContext;
use acctguard_entity::session::{DeviceClass, Session, SessionFilter, SessionOrder};
use acctguard_entity::user::UserAuthRecord;
use acctguard_store::traits::{SessionStore, UserStore};

use super::token::TokenGenerator;

/// A session that passed validation, with its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSession {
    /// The session, with `last_activity` already advanced.
    pub session: Session,
    /// The owning user.
    pub user: UserAuthRecord,
}

/// Outcome of [`SessionRegistry::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    /// The stored session.
    pub session: Session,
    /// Sessions removed to stay within the concurrency cap, oldest first.
    pub evicted: Vec<Session>,
}

/// Manages the lifecycle of bearer-token sessions.
///
/// Expiry is absolute: validation advances `last_activity` but never moves
/// `expires_at`.
#[derive(Clone)]
pub struct SessionRegistry {
    /// Session persistence.
    sessions: Arc<dyn SessionStore>,
    /// User lookup for validation.
    users: Arc<dyn UserStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Token source.
    tokens: TokenGenerator,
    /// Cap and lifetime.
    config: SessionConfig,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionRegistry {
    /// Creates the registry.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            clock,
            tokens: TokenGenerator::new(config.token_bytes),
            config,
        }
    }

    /// Issues a new session for `user_id`.
    ///
    /// Evicts the oldest non-expired sessions first so that, counting the new
    /// one, the user holds at most `max_concurrent_sessions`. Concurrent
    /// creates for one user can briefly exceed the cap.
    pub async fn create(
        &self,
        user_id: Uuid,
        ctx: &RequestContext,
        suspicious: bool,
    ) -> AppResult<CreatedSession> {
        let now = self.clock.now();
        let expires_at = self.expiry_for(now)?;
        let evicted = self.evict_for_new_session(user_id, now).await?;

        let device = DeviceClass::from_user_agent(ctx.user_agent.as_deref());
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            session_token: self.tokens.generate(),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent.clone(),
            device_info: device.label().to_string(),
            created_at: now,
            last_activity: now,
            expires_at,
            is_suspicious: suspicious,
        };
        let session = self.sessions.create(&session).await?;

        info!(
            user_id = %user_id,
            session_id = %session.id,
            device = %device,
            suspicious,
            "Session created"
        );

        Ok(CreatedSession { session, evicted })
    }

    fn expiry_for(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let hours = self.config.absolute_timeout_hours;
        Duration::try_hours(hours)
            .filter(|d| *d > Duration::zero())
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                AppError::configuration(format!("absolute_timeout_hours out of range: {hours}"))
            })
    }

    /// Removes the oldest sessions that would push the user over the cap.
    async fn evict_for_new_session(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let filter = SessionFilter::active_for(user_id, now);
        let max = u64::from(self.config.max_concurrent_sessions);
        let count = self.sessions.count_where(&filter).await?;
        if count < max {
            return Ok(Vec::new());
        }

        let overflow = (count - max + 1) as usize;
        let oldest = self
            .sessions
            .list_where_ordered(&filter, SessionOrder::CreatedAtAsc, Some(overflow))
            .await?;
        let ids: Vec<Uuid> = oldest.iter().map(|s| s.id).collect();
        let removed = self.sessions.delete_by_ids(&ids).await?;

        info!(
            user_id = %user_id,
            evicted = removed,
            "Evicted oldest sessions over the concurrency cap"
        );
        Ok(oldest)
    }

    /// Resolves a bearer token to a live session and its owner.
    ///
    /// Expired sessions are deleted on sight. Store failures are logged and
    /// reported as an invalid token.
    pub async fn validate(&self, token: &str) -> Option<ValidatedSession> {
        match self.try_validate(token).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "Session validation failed");
                None
            }
        }
    }

    async fn try_validate(&self, token: &str) -> AppResult<Option<ValidatedSession>> {
        let Some(mut session) = self.sessions.find_by_token(token).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        if session.is_expired_at(now) {
            self.sessions.delete_by_token(token).await?;
            debug!(session_id = %session.id, "Deleted expired session on validation");
            return Ok(None);
        }

        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                "Session owner no longer exists"
            );
            return Ok(None);
        };

        self.sessions.update_last_activity(session.id, now).await?;
        session.last_activity = now;

        Ok(Some(ValidatedSession { session, user }))
    }

    /// Deletes the session holding `token`. Returns `false` when nothing was
    /// removed or the store failed.
    pub async fn terminate(&self, token: &str) -> bool {
        match self.sessions.delete_by_token(token).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = %e, "Failed to terminate session");
                false
            }
        }
    }

    /// Deletes every session of `user_id`.
    pub async fn terminate_all(&self, user_id: Uuid) -> u64 {
        match self.sessions.delete_by_user_id(user_id).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(user_id = %user_id, count = removed, "Terminated all sessions");
                }
                removed
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to terminate sessions");
                0
            }
        }
    }

    /// Non-expired sessions of `user_id`, newest first.
    pub async fn list_active(&self, user_id: Uuid) -> Vec<Session> {
        let filter = SessionFilter::active_for(user_id, self.clock.now());
        match self
            .sessions
            .list_where_ordered(&filter, SessionOrder::CreatedAtDesc, None)
            .await
        {
            Ok(sessions) => sessions,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to list sessions");
                Vec::new()
            }
        }
    }

    /// Deletes every session that expired before `now`.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> u64 {
        match self.sessions.delete_where_expired(now).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(count = removed, "Cleaned up expired sessions");
                }
                removed
            }
            Err(e) => {
                error!(error = %e, "Expired session cleanup failed");
                0
            }
        }
    }

    /// Number of non-expired sessions of `user_id`.
    pub async fn count(&self, user_id: Uuid) -> u64 {
        let filter = SessionFilter::active_for(user_id, self.clock.now());
        match self.sessions.count_where(&filter).await {
            Ok(n) => n,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to count sessions");
                0
            }
        }
    }
}
