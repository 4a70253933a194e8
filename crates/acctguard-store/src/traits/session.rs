//! Session record store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use acctguard_core::result::AppResult;
use acctguard_entity::session::{Session, SessionFilter, SessionOrder};

/// Persistence for session records.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Insert a new session and return it as stored.
    async fn create(&self, session: &Session) -> AppResult<Session>;

    /// Find a session by its bearer token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>>;

    /// Set `last_activity` on one session.
    async fn update_last_activity(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Delete the session holding `token`. Returns `true` if a row was removed.
    async fn delete_by_token(&self, token: &str) -> AppResult<bool>;

    /// Delete sessions by id. Returns the number removed.
    async fn delete_by_ids(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// Delete every session of one user. Returns the number removed.
    async fn delete_by_user_id(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete every session with `expires_at < now`. Returns the number removed.
    async fn delete_where_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Count sessions matching `filter`.
    async fn count_where(&self, filter: &SessionFilter) -> AppResult<u64>;

    /// List sessions matching `filter` in `order`, ties in insertion order.
    async fn list_where_ordered(
        &self,
        filter: &SessionFilter,
        order: SessionOrder,
        limit: Option<usize>,
    ) -> AppResult<Vec<Session>>;
}
