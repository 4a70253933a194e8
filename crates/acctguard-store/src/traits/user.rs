//! User record store interface.

use async_trait::async_trait;
use uuid::Uuid;

use acctguard_core::result::AppResult;
use acctguard_entity::user::{UserAuthRecord, UserFilter, UserPatch};

/// Persistence for user auth records.
///
/// Implementations report a failed backend call as `ErrorKind::Store`.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAuthRecord>>;

    /// Write the patched columns of one user and return the updated record.
    ///
    /// Fails with `ErrorKind::NotFound` when the user does not exist.
    async fn update_fields(&self, id: Uuid, patch: &UserPatch) -> AppResult<UserAuthRecord>;

    /// Apply `patch` to every row matching `filter`, evaluated by the store
    /// at write time. Returns the number of rows changed.
    async fn batch_update_where(&self, filter: &UserFilter, patch: &UserPatch) -> AppResult<u64>;
}
