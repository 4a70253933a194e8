//! In-memory session store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_entity::session::{Session, SessionFilter, SessionOrder};

use crate::traits::SessionStore;

/// Rows keyed by insertion sequence, plus a token index.
#[derive(Debug, Default)]
struct InnerState {
    /// Next insertion sequence number.
    next_seq: u64,
    /// Sessions in insertion order.
    rows: BTreeMap<u64, Session>,
    /// Token to insertion sequence.
    by_token: HashMap<String, u64>,
}

impl InnerState {
    fn remove_seq(&mut self, seq: u64) -> Option<Session> {
        let session = self.rows.remove(&seq)?;
        self.by_token.remove(&session.session_token);
        Some(session)
    }

    fn remove_where(&mut self, pred: impl Fn(&Session) -> bool) -> u64 {
        let doomed: Vec<u64> = self
            .rows
            .iter()
            .filter(|(_, s)| pred(s))
            .map(|(seq, _)| *seq)
            .collect();
        for seq in &doomed {
            self.remove_seq(*seq);
        }
        doomed.len() as u64
    }
}

/// Session store backed by an insertion-ordered map behind a Tokio lock.
///
/// Insertion order is the tie-breaker for equal `created_at` values.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<RwLock<InnerState>>,
    unavailable: Arc<AtomicBool>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows held, expired or not, bypassing the outage switch.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Makes every trait call fail with a store error while `true`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store("Session store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> AppResult<Session> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state.by_token.contains_key(&session.session_token) {
            return Err(AppError::validation("Session token already exists"));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.by_token.insert(session.session_token.clone(), seq);
        state.rows.insert(seq, session.clone());
        Ok(session.clone())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .by_token
            .get(token)
            .and_then(|seq| state.rows.get(seq))
            .cloned())
    }

    async fn update_last_activity(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if let Some(session) = state.rows.values_mut().find(|s| s.id == id) {
            session.last_activity = at;
        }
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(seq) = state.by_token.get(token).copied() else {
            return Ok(false);
        };
        Ok(state.remove_seq(seq).is_some())
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(state.remove_where(|s| ids.contains(&s.id)))
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(state.remove_where(|s| s.user_id == user_id))
    }

    async fn delete_where_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let removed = state.remove_where(|s| s.expires_at < now);
        debug!(removed, "Deleted expired sessions");
        Ok(removed)
    }

    async fn count_where(&self, filter: &SessionFilter) -> AppResult<u64> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.rows.values().filter(|s| filter.matches(s)).count() as u64)
    }

    async fn list_where_ordered(
        &self,
        filter: &SessionFilter,
        order: SessionOrder,
        limit: Option<usize>,
    ) -> AppResult<Vec<Session>> {
        self.check_available()?;
        let state = self.state.read().await;
        // Rows iterate in insertion order; the stable sort keeps it for ties.
        let mut matched: Vec<Session> = state
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        match order {
            SessionOrder::CreatedAtAsc => matched.sort_by_key(|s| s.created_at),
            SessionOrder::CreatedAtDesc => {
                matched.reverse();
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
        }
        if let Some(limit) = limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(user_id: Uuid, token: &str, created_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id,
            session_token: token.to_string(),
            ip_address: None,
            user_agent: None,
            device_info: "Unknown Device".into(),
            created_at,
            last_activity: created_at,
            expires_at: created_at + Duration::hours(24),
            is_suspicious: false,
        }
    }

    #[tokio::test]
    async fn test_equal_created_at_orders_by_insertion() {
        let store = MemorySessionStore::new();
        let user = Uuid::new_v4();
        let t = Utc::now();
        for token in ["a", "b", "c"] {
            store.create(&session(user, token, t)).await.unwrap();
        }
        let filter = SessionFilter {
            user_id: Some(user),
            expires_after: None,
        };

        let asc = store
            .list_where_ordered(&filter, SessionOrder::CreatedAtAsc, None)
            .await
            .unwrap();
        let tokens: Vec<_> = asc.iter().map(|s| s.session_token.as_str()).collect();
        assert_eq!(tokens, ["a", "b", "c"]);

        let desc = store
            .list_where_ordered(&filter, SessionOrder::CreatedAtDesc, Some(2))
            .await
            .unwrap();
        let tokens: Vec<_> = desc.iter().map(|s| s.session_token.as_str()).collect();
        assert_eq!(tokens, ["c", "b"]);
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let store = MemorySessionStore::new();
        let user = Uuid::new_v4();
        store.create(&session(user, "dup", Utc::now())).await.unwrap();
        assert!(store.create(&session(user, "dup", Utc::now())).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_paths_keep_token_index_consistent() {
        let store = MemorySessionStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();
        let old = session(user, "old", now - Duration::hours(30));
        store.create(&old).await.unwrap();
        store.create(&session(user, "fresh", now)).await.unwrap();

        assert_eq!(store.delete_where_expired(now).await.unwrap(), 1);
        assert!(store.find_by_token("old").await.unwrap().is_none());
        assert!(!store.delete_by_token("old").await.unwrap());
        assert!(store.delete_by_token("fresh").await.unwrap());
        assert!(store.is_empty().await);
    }
}
