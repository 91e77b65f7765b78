//! Favorites sync controller.
//!
//! Each `(user, place)` pair moves Absent -> Pending-Add -> Present and
//! Present -> Pending-Remove -> Absent: the local cache is mutated
//! optimistically, the remote store is asked to commit, and a remote failure
//! rolls the cache back to the snapshot taken before the call. The remote
//! table is authoritative on success; the cache is a per-user projection of
//! it for offline reads.

use crate::error::{CoreError, CoreResult};
use crate::storage::JsonKvStore;
use crate::types::{FavoriteIds, FetchSource};
use nutrilog_client::{AuthProvider, FavoriteRecord, FavoritesStore, Place, PlaceId};
use std::collections::HashSet;
use std::sync::Arc;

const FAV_CACHE_KEY_PREFIX: &str = "favorite_places_cache:";

fn cache_key(user_id: &str) -> String {
    format!("{FAV_CACHE_KEY_PREFIX}{user_id}")
}

#[derive(Clone)]
pub struct FavoritesService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn FavoritesStore>,
    kv: Arc<JsonKvStore>,
}

impl FavoritesService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn FavoritesStore>,
        kv: Arc<JsonKvStore>,
    ) -> Self {
        Self { auth, store, kv }
    }

    async fn load_cache(&self, user_id: &str) -> HashSet<PlaceId> {
        self.kv.get(&cache_key(user_id)).await.unwrap_or_default()
    }

    async fn save_cache(&self, user_id: &str, ids: &HashSet<PlaceId>) {
        self.kv.put(&cache_key(user_id), ids).await;
    }

    async fn rollback(&self, user_id: &str, place_id: &str, before: HashSet<PlaceId>) {
        metrics::counter!("nutrilog_favorites_rollback_total").increment(1);
        tracing::warn!(%place_id, "remote favorites write failed; rolling local cache back");
        self.save_cache(user_id, &before).await;
    }

    /// Mark `place` a favorite of the current user. Requires an
    /// authenticated user; nothing is mutated without one. On remote failure
    /// the cache is restored to its exact pre-call state and the error is
    /// surfaced so the UI can tell the user the action did not persist.
    pub async fn add_favorite(&self, place: &Place) -> CoreResult<()> {
        let Some(user_id) = self.auth.current_user_id().await else {
            return Err(CoreError::Unauthenticated);
        };

        let before = self.load_cache(&user_id).await;
        let mut cached = before.clone();
        cached.insert(place.id.clone());
        self.save_cache(&user_id, &cached).await;

        let record = FavoriteRecord::from_place(&user_id, place);
        if let Err(err) = self.store.upsert(&record).await {
            self.rollback(&user_id, &place.id, before).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Remove `place_id` from the current user's favorites; mirror image of
    /// [`add_favorite`](Self::add_favorite).
    pub async fn remove_favorite(&self, place_id: &str) -> CoreResult<()> {
        let Some(user_id) = self.auth.current_user_id().await else {
            return Err(CoreError::Unauthenticated);
        };

        let before = self.load_cache(&user_id).await;
        let mut cached = before.clone();
        cached.remove(place_id);
        self.save_cache(&user_id, &cached).await;

        if let Err(err) = self.store.delete(&user_id, place_id).await {
            self.rollback(&user_id, place_id, before).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Toggle on current cached presence. Returns whether the place is a
    /// favorite after the call.
    pub async fn toggle_favorite(&self, place: &Place) -> CoreResult<bool> {
        let Some(user_id) = self.auth.current_user_id().await else {
            return Err(CoreError::Unauthenticated);
        };
        if self.load_cache(&user_id).await.contains(&place.id) {
            self.remove_favorite(&place.id).await?;
            Ok(false)
        } else {
            self.add_favorite(place).await?;
            Ok(true)
        }
    }

    /// The current user's favorite place ids. Prefers the remote store and
    /// realigns the cache on success; falls back to the last known cache
    /// when the remote is unavailable, marked as such so the caller can warn
    /// the data may be stale.
    pub async fn fetch_favorite_ids(&self) -> FavoriteIds {
        let Some(user_id) = self.auth.current_user_id().await else {
            return FavoriteIds {
                user_id: None,
                ids: HashSet::new(),
                source: FetchSource::Empty,
            };
        };

        match self.store.list_by_user(&user_id).await {
            Ok(rows) => {
                let ids: HashSet<PlaceId> = rows.into_iter().map(|r| r.place_id).collect();
                self.save_cache(&user_id, &ids).await;
                FavoriteIds {
                    user_id: Some(user_id),
                    ids,
                    source: FetchSource::Server,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "favorites list failed; serving cached ids");
                let ids = self.load_cache(&user_id).await;
                FavoriteIds {
                    user_id: Some(user_id),
                    ids,
                    source: FetchSource::Cache,
                }
            }
        }
    }

    /// Full favorite rows for the favorites screen, newest first as the
    /// remote orders them. Server-only: an unreachable remote reads as an
    /// empty list rather than a cache projection, since the cache holds ids
    /// without snapshots.
    pub async fn fetch_favorites(&self) -> Vec<FavoriteRecord> {
        let Some(user_id) = self.auth.current_user_id().await else {
            return Vec::new();
        };
        match self.store.list_by_user(&user_id).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "favorites row fetch failed");
                Vec::new()
            }
        }
    }
}
