//! Shared mock collaborators used by unit tests.
//!
//! Keep this module `#[cfg(test)]`-only; integration suites under `tests/`
//! carry their own fixtures.
#![cfg(test)]

use async_trait::async_trait;
use nutrilog_client::{
    AuthProvider, FavoriteRecord, FavoritesStore, RemoteError, UserId,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Auth provider with a fixed answer.
pub struct MockAuth {
    pub user: Option<UserId>,
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn current_user_id(&self) -> Option<UserId> {
        self.user.clone()
    }
}

/// In-memory favorites store with upsert semantics and switchable failure
/// injection for writes and reads.
#[derive(Default)]
pub struct MockFavoritesStore {
    pub rows: Arc<Mutex<Vec<FavoriteRecord>>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MockFavoritesStore {
    fn unavailable() -> RemoteError {
        RemoteError::from_status(503, "mock outage".into())
    }
}

#[async_trait]
impl FavoritesStore for MockFavoritesStore {
    async fn upsert(&self, record: &FavoriteRecord) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut rows = self.rows.lock().await;
        if let Some(existing) = rows
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.place_id == record.place_id)
        {
            *existing = record.clone();
        } else {
            rows.push(record.clone());
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, place_id: &str) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut rows = self.rows.lock().await;
        rows.retain(|r| !(r.user_id == user_id && r.place_id == place_id));
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, RemoteError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}
