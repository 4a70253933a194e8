//! In-memory user store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use acctguard_core::error::AppError;
use acctguard_core::result::AppResult;
use acctguard_entity::user::{UserAuthRecord, UserFilter, UserPatch};

use crate::traits::UserStore;

/// User store backed by a `HashMap` behind a Tokio read-write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    rows: Arc<RwLock<HashMap<Uuid, UserAuthRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record. Account creation is owned elsewhere;
    /// this seeds the store.
    pub async fn insert(&self, user: UserAuthRecord) -> UserAuthRecord {
        self.rows.write().await.insert(user.id, user.clone());
        user
    }

    /// Snapshot of one record, bypassing the outage switch.
    pub async fn get(&self, id: Uuid) -> Option<UserAuthRecord> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Makes every trait call fail with a store error while `true`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store("User store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAuthRecord>> {
        self.check_available()?;
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update_fields(&self, id: Uuid, patch: &UserPatch) -> AppResult<UserAuthRecord> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let user = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn batch_update_where(&self, filter: &UserFilter, patch: &UserPatch) -> AppResult<u64> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let mut affected = 0u64;
        for user in rows.values_mut().filter(|u| filter.matches(u)) {
            patch.apply(user);
            affected += 1;
        }
        debug!(affected, "Batch user update applied");
        Ok(affected)
    }
}
