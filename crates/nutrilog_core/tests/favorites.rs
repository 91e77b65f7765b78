use async_trait::async_trait;
use nutrilog_core::{
    AuthProvider, CoreError, FavoriteRecord, FavoritesService, FavoritesStore, FetchSource,
    JsonKvStore, Place, RemoteError, UserId,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Auth provider whose user can be swapped mid-test, for the user-switch
/// scenarios.
struct SwitchableAuth {
    user: std::sync::Mutex<Option<UserId>>,
}

impl SwitchableAuth {
    fn logged_in(user: &str) -> Self {
        Self {
            user: std::sync::Mutex::new(Some(user.into())),
        }
    }

    fn logged_out() -> Self {
        Self {
            user: std::sync::Mutex::new(None),
        }
    }

    fn switch_to(&self, user: Option<&str>) {
        *self.user.lock().unwrap() = user.map(String::from);
    }
}

#[async_trait]
impl AuthProvider for SwitchableAuth {
    async fn current_user_id(&self) -> Option<UserId> {
        self.user.lock().unwrap().clone()
    }
}

/// In-memory remote table with switchable outage injection.
#[derive(Default)]
struct FlakyStore {
    rows: Mutex<Vec<FavoriteRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FlakyStore {
    fn outage() -> RemoteError {
        RemoteError::from_status(503, "service unavailable".into())
    }
}

#[async_trait]
impl FavoritesStore for FlakyStore {
    async fn upsert(&self, record: &FavoriteRecord) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
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
            return Err(Self::outage());
        }
        let mut rows = self.rows.lock().await;
        rows.retain(|r| !(r.user_id == user_id && r.place_id == place_id));
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, RemoteError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

fn place(id: &str) -> Place {
    Place {
        id: id.into(),
        name: "Green Bowl".into(),
        kind: "restaurant".into(),
        address: Some("12 Oak St".into()),
        latitude: None,
        longitude: None,
    }
}

async fn service_with(
    auth: Arc<SwitchableAuth>,
) -> (FavoritesService, Arc<FlakyStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let kv = Arc::new(JsonKvStore::open(dir.path()).await.expect("open"));
    let store = Arc::new(FlakyStore::default());
    let service = FavoritesService::new(auth, store.clone(), kv);
    (service, store, dir)
}

#[tokio::test]
async fn unauthenticated_reads_are_empty_and_writes_fail_typed() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_out())).await;

    let read = service.fetch_favorite_ids().await;
    assert_eq!(read.source, FetchSource::Empty);
    assert_eq!(read.user_id, None);
    assert!(read.ids.is_empty());

    let err = service.add_favorite(&place("p1")).await.expect_err("no user");
    assert!(matches!(err, CoreError::Unauthenticated));
    assert!(store.rows.lock().await.is_empty());
}

#[tokio::test]
async fn add_and_remove_round_trip_against_the_remote() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    service.add_favorite(&place("p1")).await.expect("add");
    {
        let rows = store.rows.lock().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].place_name.as_deref(), Some("Green Bowl"));
    }

    // Re-adding must not duplicate.
    service.add_favorite(&place("p1")).await.expect("re-add");
    assert_eq!(store.rows.lock().await.len(), 1);

    service.remove_favorite("p1").await.expect("remove");
    assert!(store.rows.lock().await.is_empty());
}

#[tokio::test]
async fn failed_add_restores_the_exact_pre_call_cache() {
    let auth = Arc::new(SwitchableAuth::logged_in("u1"));
    let (service, store, _dir) = service_with(auth).await;

    service.add_favorite(&place("p1")).await.expect("seed p1");

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = service.add_favorite(&place("p2")).await.expect_err("outage");
    assert!(matches!(err, CoreError::Remote(RemoteError::Status { .. })));

    // Cache must hold exactly the pre-call set: p1, no trace of p2.
    store.fail_reads.store(true, Ordering::SeqCst);
    let read = service.fetch_favorite_ids().await;
    assert_eq!(read.source, FetchSource::Cache);
    assert_eq!(read.ids.len(), 1);
    assert!(read.ids.contains("p1"));
}

#[tokio::test]
async fn failed_add_of_an_existing_favorite_keeps_it_present() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    service.add_favorite(&place("p1")).await.expect("seed p1");

    store.fail_writes.store(true, Ordering::SeqCst);
    let _ = service.add_favorite(&place("p1")).await.expect_err("outage");

    store.fail_reads.store(true, Ordering::SeqCst);
    let read = service.fetch_favorite_ids().await;
    assert!(read.ids.contains("p1"), "pre-call state had p1 present");
}

#[tokio::test]
async fn failed_remove_reinserts_into_the_cache() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    service.add_favorite(&place("p1")).await.expect("seed p1");

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = service.remove_favorite("p1").await.expect_err("outage");
    assert!(matches!(err, CoreError::Remote(_)));

    store.fail_reads.store(true, Ordering::SeqCst);
    let read = service.fetch_favorite_ids().await;
    assert!(read.ids.contains("p1"));
}

#[tokio::test]
async fn fetch_prefers_server_and_falls_back_to_cache_degraded() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    service.add_favorite(&place("p1")).await.expect("add");
    service.add_favorite(&place("p2")).await.expect("add");

    let fresh = service.fetch_favorite_ids().await;
    assert_eq!(fresh.source, FetchSource::Server);
    assert_eq!(fresh.ids.len(), 2);

    store.fail_reads.store(true, Ordering::SeqCst);
    let degraded = service.fetch_favorite_ids().await;
    assert_eq!(degraded.source, FetchSource::Cache);
    assert_eq!(degraded.ids, fresh.ids);
}

#[tokio::test]
async fn toggling_twice_returns_to_the_original_state() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    assert!(service.toggle_favorite(&place("p1")).await.expect("on"));
    assert!(!service.toggle_favorite(&place("p1")).await.expect("off"));
    assert!(store.rows.lock().await.is_empty());
}

#[tokio::test]
async fn switching_users_reloads_instead_of_merging() {
    let auth = Arc::new(SwitchableAuth::logged_in("u1"));
    let (service, store, _dir) = service_with(auth.clone()).await;

    service.add_favorite(&place("p1")).await.expect("add as u1");

    auth.switch_to(Some("u2"));
    store.fail_reads.store(true, Ordering::SeqCst);
    let read = service.fetch_favorite_ids().await;
    assert_eq!(read.user_id.as_deref(), Some("u2"));
    assert!(read.ids.is_empty(), "u2 must not inherit u1's cache");
}

#[tokio::test]
async fn fetch_rows_is_server_only() {
    let (service, store, _dir) = service_with(Arc::new(SwitchableAuth::logged_in("u1"))).await;

    service.add_favorite(&place("p1")).await.expect("add");
    assert_eq!(service.fetch_favorites().await.len(), 1);

    store.fail_reads.store(true, Ordering::SeqCst);
    assert!(service.fetch_favorites().await.is_empty());
}
